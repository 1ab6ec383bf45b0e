//! Headless-browser capability used for screenshots. The scanner only needs
//! `render(url) -> PNG bytes`; the Chrome implementation below is the single
//! default, and tests substitute their own renderer.

use std::ffi::OsStr;
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};

use crate::constants::WEBDRIVER_TIMEOUT;
use crate::error::Error;

pub trait PageRenderer {
    /// Navigate to `url` and return a PNG screenshot of the rendered page.
    fn render(&self, url: &str) -> Result<Vec<u8>, Error>;
}

pub struct HeadlessBrowser {
    browser: Browser,
    user_agent: String,
}

/// Proxy for the browser to use, from the conventional environment variables
/// (lowercase preferred, uppercase honoured).
fn proxy_from_env() -> Option<String> {
    ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

impl HeadlessBrowser {
    pub fn launch(user_agent: &str) -> Result<HeadlessBrowser, Error> {
        let proxy = proxy_from_env();

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1366, 768)))
            .idle_browser_timeout(Duration::from_secs(300))
            .args(vec![
                OsStr::new("--ignore-certificate-errors"),
                OsStr::new("--incognito"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-notifications"),
                OsStr::new("--disable-sync"),
                OsStr::new("--disable-background-networking"),
                OsStr::new("--dns-prefetch-disable"),
                OsStr::new("--no-first-run"),
                OsStr::new("--no-default-browser-check"),
                OsStr::new("--hide-scrollbars"),
                OsStr::new("--mute-audio"),
            ])
            .proxy_server(proxy.as_deref())
            .build()
            .map_err(|err| Error::Init(format!("browser launch options: {err}")))?;

        let browser =
            Browser::new(options).map_err(|err| Error::Init(format!("browser launch: {err}")))?;

        Ok(HeadlessBrowser {
            browser,
            user_agent: user_agent.to_string(),
        })
    }
}

impl PageRenderer for HeadlessBrowser {
    fn render(&self, url: &str) -> Result<Vec<u8>, Error> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|err| Error::Network(format!("browser tab: {err}")))?;

        tab.set_default_timeout(WEBDRIVER_TIMEOUT);

        let screenshot = (|| {
            tab.set_user_agent(&self.user_agent, None, None)?;
            tab.navigate_to(url)?;
            tab.wait_until_navigated()?;
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        })()
        .map_err(|err| Error::Network(format!("render {url}: {err}")));

        let _ = tab.close(true);
        screenshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticRenderer(Vec<u8>);

    impl PageRenderer for StaticRenderer {
        fn render(&self, _url: &str) -> Result<Vec<u8>, Error> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_renderer_is_object_safe() {
        let renderer: Box<dyn PageRenderer> = Box::new(StaticRenderer(vec![1, 2, 3]));
        assert_eq!(renderer.render("http://example.com").unwrap(), vec![1, 2, 3]);
    }
}
