pub mod count;
pub mod threshold;
pub mod validate;

use std::time::Duration;

/// End timestamp (now when not given) and window length in whole seconds.
pub(crate) fn resolve_window(timestamp: Option<i64>, window: Duration) -> anyhow::Result<(i64, i64)> {
    let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let window = i64::try_from(window.as_secs())?;

    if window == 0 {
        anyhow::bail!("Window must be at least one second");
    }

    Ok((timestamp, window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_window() {
        let (timestamp, window) =
            resolve_window(Some(1612257900), Duration::from_secs(3600)).unwrap();
        assert_eq!(timestamp, 1612257900);
        assert_eq!(window, 3600);

        assert!(resolve_window(Some(1), Duration::from_millis(500)).is_err());
    }
}
