use prometheus::{IntCounter, Registry};

pub struct Metrics {
    pub datasets_loaded: IntCounter,
    pub charts_rendered: IntCounter,
    pub llm_requests: IntCounter,
    pub llm_failures: IntCounter,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Self {
        let datasets_loaded =
            IntCounter::new("datasets_loaded", "Datasets successfully loaded").unwrap();
        let charts_rendered = IntCounter::new("charts_rendered", "Chart images written").unwrap();
        let llm_requests = IntCounter::new("llm_requests", "Narrative requests issued").unwrap();
        let llm_failures =
            IntCounter::new("llm_failures", "Narrative requests that degraded").unwrap();
        for counter in [
            &datasets_loaded,
            &charts_rendered,
            &llm_requests,
            &llm_failures,
        ] {
            registry.register(Box::new(counter.clone())).unwrap();
        }
        Self {
            datasets_loaded,
            charts_rendered,
            llm_requests,
            llm_failures,
        }
    }
}
