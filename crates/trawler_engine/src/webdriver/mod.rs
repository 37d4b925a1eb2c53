//! WebDriver-backed implementation of the surface traits.
mod browser;
mod client;
mod scripts;

pub use browser::{chrome_capabilities, BrowserSettings, ChromeBrowser};
pub use client::{ElementRef, WebDriver, WebDriverError, ELEMENT_KEY, KEY_ARROW_DOWN, KEY_ARROW_UP};
