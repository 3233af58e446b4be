//! Chromium driver over the DevTools protocol.
//!
//! Element operations are evaluated in the page as small scripts built from
//! [`Selector::to_elements_query`]. Every script returns a JSON string, so
//! `null` (no element) survives the CDP round trip unchanged.
//!
//! Native dialogs suspend script evaluation until answered. A click that
//! opens an alert therefore only completes once an armed
//! [`crate::DialogInterceptor`] has accepted it; without one the click fails
//! after the action timeout.

use crate::config::BrowserEngine;
use crate::dialog::{Dialog, DialogType};
use crate::driver::{BrowserDriver, DriverConfig, Screenshot};
use crate::locator::{BoundingBox, Selector};
use crate::result::{TellerError, TellerResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, DialogType as CdpDialogType,
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Dialog events kept for slow subscribers
const DIALOG_CHANNEL_CAPACITY: usize = 16;

/// Chromium tab driven over CDP
pub struct CdpDriver {
    config: DriverConfig,
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    dialogs: broadcast::Sender<Dialog>,
    closed: AtomicBool,
    handler: JoinHandle<()>,
    dialog_pump: JoinHandle<()>,
}

impl std::fmt::Debug for CdpDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpDriver")
            .field("config", &self.config)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RawBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn launch_error(e: impl std::fmt::Display) -> TellerError {
    TellerError::BrowserLaunch { message: e.to_string() }
}

fn dialog_type(kind: &CdpDialogType) -> DialogType {
    match kind {
        CdpDialogType::Alert => DialogType::Alert,
        CdpDialogType::Confirm => DialogType::Confirm,
        CdpDialogType::Prompt => DialogType::Prompt,
        CdpDialogType::Beforeunload => DialogType::BeforeUnload,
    }
}

/// Map an evaluation failure, recognising CSS syntax errors
fn script_error(selector: Option<&Selector>, message: String) -> TellerError {
    match selector {
        Some(selector)
            if message.contains("is not a valid selector") || message.contains("SyntaxError") =>
        {
            TellerError::InvalidSelector {
                selector: selector.to_string(),
                message,
            }
        }
        _ => TellerError::driver(message),
    }
}

/// Wrap `body` so it runs with `el` bound to the first match, evaluating to
/// `null` when nothing matches
fn on_first(selector: &Selector, body: &str) -> String {
    format!(
        "(() => {{ const el = ({})[0]; if (!el) return JSON.stringify(null); {body} }})()",
        selector.to_elements_query()
    )
}

/// Visibility test shared by `is_visible` and `bounding_box`
const VISIBLE: &str = "!!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) \
                       && getComputedStyle(el).visibility !== 'hidden'";

impl CdpDriver {
    /// Launch Chromium and open one blank tab
    pub async fn launch(config: DriverConfig) -> TellerResult<Self> {
        if config.engine != BrowserEngine::Chromium {
            return Err(launch_error(format!(
                "{} cannot be driven over CDP; use chromium",
                config.engine
            )));
        }

        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(launch_error)?;
        let (dialogs, _) = broadcast::channel(DIALOG_CHANNEL_CAPACITY);
        let mut openings = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(launch_error)?;
        let sender = dialogs.clone();
        let dialog_pump = tokio::spawn(async move {
            while let Some(event) = openings.next().await {
                let mut dialog = Dialog::new(dialog_type(&event.r#type), event.message.clone());
                if let Some(default) = &event.default_prompt {
                    dialog = Dialog::prompt(event.message.clone(), Some(default.clone()));
                }
                tracing::debug!(
                    kind = %dialog.dialog_type(),
                    message = dialog.message(),
                    "dialog opened"
                );
                // no receiver means nobody armed a capture
                let _ = sender.send(dialog);
            }
        });

        tracing::info!(
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            "chromium launched"
        );
        Ok(Self {
            config,
            browser: Mutex::new(browser),
            page,
            dialogs,
            closed: AtomicBool::new(false),
            handler,
            dialog_pump,
        })
    }

    fn ensure_open(&self) -> TellerResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TellerError::driver("target page has been closed"));
        }
        Ok(())
    }

    /// Evaluate a script that returns a JSON string, bounded by the action
    /// timeout
    async fn eval<T: DeserializeOwned>(
        &self,
        selector: Option<&Selector>,
        script: String,
    ) -> TellerResult<T> {
        self.ensure_open()?;
        let timeout = self.config.action_timeout;
        let evaluated = tokio::time::timeout(timeout, self.page.evaluate(script))
            .await
            .map_err(|_| TellerError::Timeout {
                ms: timeout.as_millis() as u64,
                waited_for: selector
                    .map_or_else(|| "page script".to_string(), |s| format!("script on {s}")),
            })?
            .map_err(|e| script_error(selector, e.to_string()))?;
        let json: String = evaluated
            .into_value()
            .map_err(|e| TellerError::driver(format!("unexpected script result: {e}")))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Like [`Self::eval`] for scripts built with [`on_first`]; a `null`
    /// result becomes a locator error
    async fn eval_required<T: DeserializeOwned>(
        &self,
        selector: &Selector,
        body: &str,
    ) -> TellerResult<T> {
        let value: Option<T> = self.eval(Some(selector), on_first(selector, body)).await?;
        value.ok_or_else(|| TellerError::locator(selector.to_string(), "no element matches"))
    }

    async fn answer_dialog(&self, params: HandleJavaScriptDialogParams) -> TellerResult<()> {
        self.ensure_open()?;
        self.page
            .execute(params)
            .await
            .map_err(|e| TellerError::driver(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    fn engine(&self) -> BrowserEngine {
        self.config.engine
    }

    async fn navigate(&self, url: &str) -> TellerResult<()> {
        self.ensure_open()?;
        let navigation_error = |message: String| TellerError::Navigation {
            url: url.to_string(),
            message,
        };
        tokio::time::timeout(self.config.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| navigation_error("navigation timed out".to_string()))?
            .map_err(|e| navigation_error(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> TellerResult<String> {
        self.ensure_open()?;
        let url = self
            .page
            .url()
            .await
            .map_err(|e| TellerError::driver(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn load_state_reached(&self, state: LoadState) -> TellerResult<bool> {
        let script = match state {
            LoadState::DomContentLoaded => "JSON.stringify(document.readyState !== 'loading')",
            LoadState::NetworkIdle => {
                "(() => { let pending = 0; try { \
                   pending = angular.element(document.body).injector().get('$http').pendingRequests.length; \
                 } catch (e) {} \
                 return JSON.stringify(document.readyState === 'complete' && pending === 0); })()"
            }
        };
        self.eval(None, script.to_string()).await
    }

    async fn count(&self, selector: &Selector) -> TellerResult<usize> {
        let script = format!("JSON.stringify({})", selector.to_count_query());
        self.eval(Some(selector), script).await
    }

    async fn is_visible(&self, selector: &Selector) -> TellerResult<bool> {
        let visible: Option<bool> = self
            .eval(Some(selector), on_first(selector, &format!("return JSON.stringify({VISIBLE});")))
            .await?;
        Ok(visible.unwrap_or(false))
    }

    async fn text_content(&self, selector: &Selector) -> TellerResult<Option<String>> {
        let body = "return JSON.stringify(el.textContent || '');";
        self.eval(Some(selector), on_first(selector, body)).await
    }

    async fn all_text_contents(&self, selector: &Selector) -> TellerResult<Vec<String>> {
        let script = format!(
            "JSON.stringify(({}).map(el => el.textContent || ''))",
            selector.to_elements_query()
        );
        self.eval(Some(selector), script).await
    }

    async fn click(&self, selector: &Selector) -> TellerResult<()> {
        tracing::debug!(%selector, "click");
        self.eval_required::<bool>(
            selector,
            "el.scrollIntoView({block: 'center'}); el.click(); return JSON.stringify(true);",
        )
        .await?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> TellerResult<()> {
        let literal = serde_json::Value::from(value).to_string();
        let body = format!(
            "el.focus(); el.value = {literal}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return JSON.stringify(true);"
        );
        self.eval_required::<bool>(selector, &body).await?;
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, label: &str) -> TellerResult<()> {
        let literal = serde_json::Value::from(label.trim()).to_string();
        let body = format!(
            "const opt = Array.from(el.options || []).find(o => o.text.trim() === {literal}); \
             if (!opt) return JSON.stringify(false); \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return JSON.stringify(true);"
        );
        if self.eval_required::<bool>(selector, &body).await? {
            Ok(())
        } else {
            Err(TellerError::locator(
                selector.to_string(),
                format!("no option labelled {label:?}"),
            ))
        }
    }

    async fn input_value(&self, selector: &Selector) -> TellerResult<String> {
        self.eval_required(selector, "return JSON.stringify(el.value ?? '');")
            .await
    }

    async fn validation_message(&self, selector: &Selector) -> TellerResult<String> {
        self.eval_required(selector, "return JSON.stringify(el.validationMessage || '');")
            .await
    }

    async fn computed_style(&self, selector: &Selector, property: &str) -> TellerResult<String> {
        let literal = serde_json::Value::from(property).to_string();
        let body =
            format!("return JSON.stringify(getComputedStyle(el).getPropertyValue({literal}));");
        self.eval_required(selector, &body).await
    }

    async fn bounding_box(&self, selector: &Selector) -> TellerResult<Option<BoundingBox>> {
        let body = format!(
            "if (!({VISIBLE})) return JSON.stringify(null); \
             const r = el.getBoundingClientRect(); \
             return JSON.stringify({{x: r.x, y: r.y, width: r.width, height: r.height}});"
        );
        let raw: Option<RawBox> = self.eval(Some(selector), on_first(selector, &body)).await?;
        Ok(raw.map(|b| BoundingBox::new(b.x, b.y, b.width, b.height)))
    }

    async fn screenshot(&self) -> TellerResult<Screenshot> {
        self.ensure_open()?;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| TellerError::driver(e.to_string()))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| TellerError::driver(format!("screenshot payload: {e}")))?;
        Ok(Screenshot::new(data))
    }

    fn subscribe_dialogs(&self) -> broadcast::Receiver<Dialog> {
        self.dialogs.subscribe()
    }

    async fn accept_dialog(&self, prompt_text: Option<String>) -> TellerResult<()> {
        let mut params = HandleJavaScriptDialogParams::new(true);
        params.prompt_text = prompt_text;
        self.answer_dialog(params).await
    }

    async fn dismiss_dialog(&self) -> TellerResult<()> {
        self.answer_dialog(HandleJavaScriptDialogParams::new(false)).await
    }

    async fn close(&self) -> TellerResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.dialog_pump.abort();
        if let Err(e) = self.page.clone().close().await {
            tracing::warn!(error = %e, "closing tab failed");
        }
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        self.handler.abort();
        closed.map_err(|e| TellerError::driver(e.to_string()))?;
        tracing::info!("chromium closed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_on_first_guards_missing_element() {
        let script = on_first(&Selector::css("#userSelect"), "return JSON.stringify(el.id);");
        assert!(script.contains(r#"document.querySelectorAll("#userSelect")"#));
        assert!(script.contains("if (!el) return JSON.stringify(null);"));
        assert!(script.ends_with("})()"));
    }

    #[test]
    fn test_script_error_classification() {
        let selector = Selector::css("button[");
        let message = "SyntaxError: 'button[' is not a valid selector".to_string();
        let err = script_error(Some(&selector), message);
        assert!(matches!(err, TellerError::InvalidSelector { .. }));
        let err = script_error(Some(&selector), "Execution context was destroyed".into());
        assert!(matches!(err, TellerError::Driver { .. }));
        let err = script_error(None, "SyntaxError: unexpected token".into());
        assert!(matches!(err, TellerError::Driver { .. }));
    }

    #[test]
    fn test_dialog_type_mapping() {
        assert_eq!(dialog_type(&CdpDialogType::Alert), DialogType::Alert);
        assert_eq!(dialog_type(&CdpDialogType::Beforeunload), DialogType::BeforeUnload);
    }

    #[tokio::test]
    async fn test_non_chromium_engine_rejected() {
        let config = DriverConfig {
            engine: BrowserEngine::Firefox,
            ..DriverConfig::default()
        };
        let err = CdpDriver::launch(config).await.unwrap_err();
        assert!(matches!(err, TellerError::BrowserLaunch { .. }));
    }
}
