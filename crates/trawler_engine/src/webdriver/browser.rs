use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::runtime::Runtime;
use trawler_logging::{trawl_debug, trawl_info};

use super::client::{ElementRef, WebDriver, WebDriverError, KEY_ARROW_DOWN, KEY_ARROW_UP};
use super::scripts;
use crate::surface::{ItemActions, TransferEntry, TransferStatusView, VirtualList};
use crate::SurfaceError;

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub request_timeout: Duration,
    pub headless: bool,
    /// Page holding the transfer-status view, opened in the first window.
    pub status_view_url: String,
    /// Present once the list has rendered rows.
    pub list_selector: String,
    /// The control that starts a transfer for the focused row.
    pub acquire_selector: String,
    /// Attribute of the focused row that carries its label.
    pub label_attribute: String,
    /// Overlays removed before enumeration so they cannot steal focus.
    pub obstructing_selectors: Vec<String>,
    pub key_pace: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            request_timeout: Duration::from_secs(60),
            headless: false,
            status_view_url: "chrome://downloads".to_string(),
            list_selector: r#"[data-automationid="DetailsRowCell"]"#.to_string(),
            acquire_selector: r#"[data-automationid="downloadCommand"]"#.to_string(),
            label_attribute: "aria-label".to_string(),
            obstructing_selectors: vec![
                ".ms-FocusZone.ms-DetailsHeader".to_string(),
                "div.od-ItemsScopeItemContent-header.od-ItemContent-header".to_string(),
            ],
            key_pace: Duration::from_millis(100),
        }
    }
}

/// Chrome capabilities that send every transfer straight into `download_dir`.
pub fn chrome_capabilities(settings: &BrowserSettings, download_dir: &Path) -> Value {
    let mut args = vec!["--log-level=3", "--disable-logging"];
    if settings.headless {
        args.push("--headless=new");
    }
    json!({
        "browserName": "chrome",
        "goog:chromeOptions": {
            "args": args,
            "prefs": {
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "safebrowsing.enabled": true,
            },
        },
    })
}

/// Blocking browser session over WebDriver.
///
/// The status view lives in the first window and the list in a second one;
/// the engine only sees the surface traits.
pub struct ChromeBrowser {
    runtime: Runtime,
    driver: WebDriver,
    settings: BrowserSettings,
    status_window: String,
    list_window: Option<String>,
    focused: Option<ElementRef>,
}

impl ChromeBrowser {
    pub fn launch(settings: BrowserSettings, download_dir: &Path) -> Result<Self, SurfaceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| SurfaceError::Other(format!("tokio runtime: {err}")))?;

        let capabilities = chrome_capabilities(&settings, download_dir);
        let driver = runtime.block_on(WebDriver::connect(
            &settings.webdriver_url,
            capabilities,
            settings.request_timeout,
        ))?;
        trawl_info!("WebDriver session {} started", driver.session_id());

        runtime.block_on(driver.navigate(&settings.status_view_url))?;
        let status_window = runtime.block_on(driver.current_window())?;

        Ok(Self {
            runtime,
            driver,
            settings,
            status_window,
            list_window: None,
            focused: None,
        })
    }

    /// Open `list_url` in a second window and focus it.
    pub fn open_list(&mut self, list_url: &str) -> Result<(), SurfaceError> {
        self.run(self.driver.execute(scripts::OPEN_WINDOW, vec![json!(list_url)]))?;
        let handles = self.run(self.driver.window_handles())?;
        let list_window = handles
            .into_iter()
            .find(|handle| *handle != self.status_window)
            .ok_or_else(|| SurfaceError::NotFound("list window".to_string()))?;
        self.run(self.driver.switch_to_window(&list_window))?;
        self.list_window = Some(list_window);
        Ok(())
    }

    pub fn quit(self) -> Result<(), SurfaceError> {
        self.runtime.block_on(self.driver.quit())?;
        Ok(())
    }

    fn run<T>(&self, command: impl Future<Output = Result<T, WebDriverError>>) -> Result<T, SurfaceError> {
        self.runtime.block_on(command).map_err(SurfaceError::from)
    }

    fn pause(&self) {
        self.runtime.block_on(tokio::time::sleep(self.settings.key_pace));
    }

    fn focused_element(&mut self) -> Result<ElementRef, SurfaceError> {
        if let Some(element) = &self.focused {
            return Ok(element.clone());
        }
        let element = self.run(self.driver.active_element())?;
        self.focused = Some(element.clone());
        Ok(element)
    }

    fn acquire_control(&self) -> Result<Option<ElementRef>, SurfaceError> {
        self.run(self.driver.find_element(&self.settings.acquire_selector))
    }
}

impl VirtualList for ChromeBrowser {
    fn is_rendered(&mut self) -> Result<bool, SurfaceError> {
        let row = self.run(self.driver.find_element(&self.settings.list_selector))?;
        Ok(row.is_some())
    }

    /// Drop header overlays, then nudge focus down and back up onto the first row.
    fn prepare(&mut self) -> Result<(), SurfaceError> {
        for selector in &self.settings.obstructing_selectors {
            let removed =
                self.run(self.driver.execute(scripts::REMOVE_ELEMENT, vec![json!(selector)]))?;
            trawl_debug!("Removed overlay {}: {}", selector, removed);
        }
        self.run(self.driver.press_key(KEY_ARROW_DOWN))?;
        self.pause();
        self.run(self.driver.press_key(KEY_ARROW_UP))?;
        self.pause();
        Ok(())
    }

    fn current_label(&mut self) -> Result<Option<String>, SurfaceError> {
        let element = self.run(self.driver.active_element())?;
        let label = self.run(
            self.driver
                .attribute(&element, &self.settings.label_attribute),
        )?;
        self.focused = Some(element);
        Ok(label)
    }

    fn advance(&mut self) -> Result<(), SurfaceError> {
        self.focused = None;
        self.run(self.driver.press_key(KEY_ARROW_DOWN))
    }
}

impl ItemActions for ChromeBrowser {
    fn reveal_focused(&mut self) -> Result<(), SurfaceError> {
        let element = self.focused_element()?;
        self.run(
            self.driver
                .execute(scripts::SCROLL_INTO_VIEW, vec![element.to_json()]),
        )?;
        trawl_info!("Scrolled to the focused entry.");
        Ok(())
    }

    fn acquire_control_ready(&mut self) -> Result<bool, SurfaceError> {
        let Some(control) = self.acquire_control()? else {
            return Ok(false);
        };
        let displayed = self.run(self.driver.is_displayed(&control))?;
        let enabled = self.run(self.driver.is_enabled(&control))?;
        Ok(displayed && enabled)
    }

    fn invoke_acquire_control(&mut self) -> Result<(), SurfaceError> {
        let control = self
            .acquire_control()?
            .ok_or_else(|| SurfaceError::NotFound(self.settings.acquire_selector.clone()))?;
        self.run(self.driver.click(&control))
    }

    fn refocus(&mut self) -> Result<(), SurfaceError> {
        match self.focused.clone() {
            Some(element) => self.run(self.driver.click(&element)),
            None => Ok(()),
        }
    }
}

impl TransferStatusView for ChromeBrowser {
    fn open_status_view(&mut self) -> Result<(), SurfaceError> {
        self.run(self.driver.switch_to_window(&self.status_window))
    }

    fn close_status_view(&mut self) -> Result<(), SurfaceError> {
        match &self.list_window {
            Some(handle) => self.run(self.driver.switch_to_window(handle)),
            None => Ok(()),
        }
    }

    fn transfer_entries(&mut self) -> Result<Vec<TransferEntry>, SurfaceError> {
        let value = self.run(self.driver.execute(&scripts::list_entries(), Vec::new()))?;
        let labels: Vec<String> = serde_json::from_value(value)
            .map_err(|err| SurfaceError::Other(format!("transfer entries: {err}")))?;
        Ok(labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| TransferEntry { index, label })
            .collect())
    }

    fn entry_actions(&mut self, entry: &TransferEntry) -> Result<Vec<String>, SurfaceError> {
        let value = self.run(
            self.driver
                .execute(&scripts::entry_actions(), vec![json!(entry.index)]),
        )?;
        serde_json::from_value(value)
            .map_err(|err| SurfaceError::Other(format!("entry actions: {err}")))
    }

    fn invoke_entry_action(
        &mut self,
        entry: &TransferEntry,
        action: &str,
    ) -> Result<(), SurfaceError> {
        let clicked = self.run(self.driver.execute(
            &scripts::invoke_action(),
            vec![json!(entry.index), json!(action)],
        ))?;
        if clicked.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(SurfaceError::NotFound(format!(
                "{action:?} control of entry {}",
                entry.index
            )))
        }
    }
}
