use crate::config::CdpConfig;

/// URL handed to `Browser::connect`.
///
/// An explicit websocket URL wins; otherwise the debugger address is turned into
/// an `http://` endpoint, from which the browser websocket is discovered.
pub fn endpoint_url(cfg: &CdpConfig) -> String {
    if let Some(ws) = cfg.websocket_url.as_deref().map(str::trim) {
        if !ws.is_empty() {
            return ws.to_string();
        }
    }

    let addr = cfg.debugger_addr.trim().trim_end_matches('/');
    if addr.starts_with("http://") || addr.starts_with("https://") || addr.starts_with("ws") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_debugger() {
        assert_eq!(endpoint_url(&CdpConfig::default()), "http://127.0.0.1:9222");
    }

    #[test]
    fn websocket_url_takes_precedence() {
        let cfg = CdpConfig {
            websocket_url: Some("ws://127.0.0.1:9222/devtools/browser/abc".into()),
            ..CdpConfig::default()
        };
        assert_eq!(endpoint_url(&cfg), "ws://127.0.0.1:9222/devtools/browser/abc");
    }

    #[test]
    fn keeps_explicit_scheme() {
        let cfg = CdpConfig {
            debugger_addr: "http://localhost:9333/".into(),
            ..CdpConfig::default()
        };
        assert_eq!(endpoint_url(&cfg), "http://localhost:9333");
    }
}
