//! Chromium driver over the Chrome `DevTools` Protocol.
//!
//! [`ChromiumDriver`] is a blocking [`AutomationDriver`]: it owns a tokio
//! runtime and drives chromiumoxide futures to completion on each call.
//! Element commands are JavaScript snippets built from
//! [`Selector::to_query`](crate::Selector::to_query), so every selector
//! strategy works without strategy-specific CDP calls.

use crate::context::DriverFactory;
use crate::driver::{AutomationDriver, DriverConfig, ElementHandle};
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

fn js_str(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Wrap `body` so it runs with `el` bound to the first match.
///
/// Yields `[result]`, or `[]` when nothing matches; a bare `null` would not
/// survive CDP's remote object encoding.
fn element_script(locator: &Locator, body: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return []; const run = () => {{ {body} }}; return [run()]; }})()",
        locator.selector().to_query()
    )
}

/// Set an input's value through the native setter so framework listeners fire
fn set_value_script(locator: &Locator, value_expr: &str) -> String {
    element_script(
        locator,
        &format!(
            "const proto = Object.getPrototypeOf(el); \
             const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
             const next = {value_expr}; \
             if (desc && desc.set) {{ desc.set.call(el, next); }} else {{ el.value = next; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;"
        ),
    )
}

const DISPLAYED_BODY: &str = "const style = window.getComputedStyle(el); \
     const rect = el.getBoundingClientRect(); \
     return style.display !== 'none' && style.visibility !== 'hidden' \
         && rect.width > 0 && rect.height > 0;";

/// Blocking CDP driver
pub struct ChromiumDriver {
    runtime: Runtime,
    browser: Mutex<Option<CdpBrowser>>,
    page: CdpPage,
    handler: JoinHandle<()>,
    headless: bool,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("headless", &self.headless)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub fn launch(config: &DriverConfig) -> DriverResult<Self> {
        let launch_err = |e: &dyn fmt::Display| DriverError::Launch {
            message: e.to_string(),
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| launch_err(&e))?;

        let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(|e| launch_err(&e))?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| launch_err(&e))?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| launch_err(&e))?;
            Ok::<_, DriverError>((browser, page, handler))
        })?;

        tracing::info!(headless = config.headless, "chromium launched");
        Ok(Self {
            runtime,
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            headless: config.headless,
        })
    }

    fn eval<T: DeserializeOwned>(&self, command: &str, script: String) -> DriverResult<T> {
        self.runtime.block_on(async {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| DriverError::command(command, e.to_string()))?;
            result
                .into_value::<T>()
                .map_err(|e| DriverError::command(command, e.to_string()))
        })
    }

    fn run_script<T: DeserializeOwned>(&self, command: &str, locator: &Locator, script: String) -> DriverResult<T> {
        self.eval::<Vec<T>>(command, script)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound {
                selector: locator.to_string(),
            })
    }

    fn on_element<T: DeserializeOwned>(&self, command: &str, locator: &Locator, body: &str) -> DriverResult<T> {
        self.run_script(command, locator, element_script(locator, body))
    }
}

impl AutomationDriver for ChromiumDriver {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle> {
        let tag: String = self.on_element("find_element", locator, "return el.tagName.toLowerCase();")?;
        Ok(ElementHandle::new(*locator).with_tag(tag))
    }

    fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.on_element::<bool>(
            "click",
            &element.locator,
            "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
        )
        .map(drop)
    }

    fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        let script = set_value_script(&element.locator, "''");
        self.run_script::<bool>("clear", &element.locator, script).map(drop)
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let value_expr = format!("(el.value || '') + {}", js_str(text));
        let script = set_value_script(&element.locator, &value_expr);
        self.run_script::<bool>("send_keys", &element.locator, script).map(drop)
    }

    fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        self.on_element(
            "text",
            &element.locator,
            "return (el.innerText ?? el.textContent ?? '').trim();",
        )
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let name = js_str(name);
        let body = format!(
            "const v = el.getAttribute({name}); \
             return v !== null ? v : ({name} === 'value' && 'value' in el ? String(el.value) : null);"
        );
        self.on_element("attribute", &element.locator, &body)
    }

    fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.on_element("is_displayed", &element.locator, DISPLAYED_BODY)
    }

    fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.on_element("is_enabled", &element.locator, "return !el.disabled;")
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.runtime.block_on(async {
            self.page
                .goto(url)
                .await
                .map(drop)
                .map_err(|e| DriverError::command("navigate", format!("{url}: {e}")))
        })
    }

    fn current_url(&self) -> DriverResult<String> {
        self.runtime.block_on(async {
            self.page
                .url()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| DriverError::command("current_url", e.to_string()))
        })
    }

    fn title(&self) -> DriverResult<String> {
        self.runtime.block_on(async {
            self.page
                .get_title()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| DriverError::command("title", e.to_string()))
        })
    }

    fn page_source(&self) -> DriverResult<String> {
        self.runtime.block_on(async {
            self.page
                .content()
                .await
                .map_err(|e| DriverError::command("page_source", e.to_string()))
        })
    }

    fn quit(&self) -> DriverResult<()> {
        let browser = self.browser.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(mut browser) = browser {
            self.runtime.block_on(async {
                let _ = browser
                    .close()
                    .await
                    .map_err(|e| DriverError::command("quit", e.to_string()))?;
                let _ = browser.wait().await;
                Ok::<_, DriverError>(())
            })?;
            self.handler.abort();
            tracing::info!("chromium closed");
        }
        Ok(())
    }
}

/// Starts a [`ChromiumDriver`] per scenario
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumFactory;

impl DriverFactory for ChromiumFactory {
    fn create(&self, config: &DriverConfig) -> DriverResult<Box<dyn AutomationDriver>> {
        Ok(Box::new(ChromiumDriver::launch(config)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod script_tests {
        use super::*;

        #[test]
        fn test_element_script_guards_null() {
            let script = element_script(&Locator::id("user-name"), "return el.value;");
            assert!(script.starts_with("(() => { const el = document.getElementById(\"user-name\");"));
            assert!(script.contains("if (!el) return [];"));
            assert!(script.ends_with("return [run()]; })()"));
        }

        #[test]
        fn test_set_value_fires_input_events() {
            let script = set_value_script(&Locator::id("password"), "''");
            assert!(script.contains("desc.set.call(el, next)"));
            assert!(script.contains("new Event('input'"));
            assert!(script.contains("new Event('change'"));
        }

        #[test]
        fn test_text_is_quoted() {
            assert_eq!(js_str("it's \"quoted\""), r#""it's \"quoted\"""#);
        }
    }

    mod live_tests {
        use super::*;

        #[test]
        #[ignore = "requires a local chromium"]
        fn test_launch_and_read_title() {
            let driver = ChromiumDriver::launch(&DriverConfig::default().no_sandbox()).unwrap();
            driver
                .navigate("data:text/html,<title>pagestep</title><input id='q'>")
                .unwrap();
            assert_eq!(driver.title().unwrap(), "pagestep");
            assert!(driver.page_source().unwrap().contains("id=\"q\""));

            let input = driver.find_element(&Locator::id("q")).unwrap();
            driver.send_keys(&input, "hello").unwrap();
            assert_eq!(driver.attribute(&input, "value").unwrap().as_deref(), Some("hello"));
            driver.quit().unwrap();
        }
    }
}
