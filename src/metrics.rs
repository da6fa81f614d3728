use prometheus::{Encoder, TextEncoder};

/// Renders all registered metrics in the Prometheus text exposition format.
pub fn metrics_handler() -> Result<String, prometheus::Error> {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|_| prometheus::Error::Msg("non-utf8 metrics".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_as_text() {
        let body = metrics_handler().expect("metrics encode");
        assert!(body.is_ascii());
    }
}
