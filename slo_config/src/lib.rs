pub mod config;
pub mod parser;

pub use config::{BackendConfig, Measurement, SloConfig, SloConfigFile, Timezone};
pub use parser::{parse_config_from_file, parse_config_from_str};
