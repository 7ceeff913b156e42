use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(size) = config.group_size {
        if size < 1 {
            errors.push(format!("group_size: must be at least 1, got {}", size));
        }
    }

    if let Some(ref scale) = config.answer_scale {
        if scale.min > scale.max {
            errors.push(format!(
                "answer_scale: min ({}) must not exceed max ({})",
                scale.min, scale.max
            ));
        }
    }

    if let Some(ref path) = config.data_path {
        if path.as_os_str().is_empty() {
            errors.push("data_path: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
