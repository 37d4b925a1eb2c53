//! Scripts run inside the browser through `execute/sync`.
//!
//! The status view is built from nested shadow roots, so entries are reached
//! by walking `downloads-manager` -> `#downloadsList` -> `downloads-item`.

/// `arguments[0]`: URL to open in a new window.
pub const OPEN_WINDOW: &str = "window.open(arguments[0]);";

/// `arguments[0]`: CSS selector of an element to remove. Returns whether it existed.
pub const REMOVE_ELEMENT: &str = r#"
const element = document.querySelector(arguments[0]);
if (element) {
  element.remove();
  return true;
}
return false;
"#;

/// `arguments[0]`: element to scroll to.
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

const STATUS_ITEMS: &str = r#"
const manager = document.querySelector('downloads-manager');
const list = manager && manager.shadowRoot
  ? manager.shadowRoot.getElementById('downloadsList')
  : null;
const items = list ? Array.from(list.querySelectorAll('downloads-item')) : [];
"#;

const LIST_ENTRIES_BODY: &str = r#"
return items.map((item) => {
  const link = item.shadowRoot ? item.shadowRoot.querySelector('a#file-link') : null;
  return link ? link.innerText : '';
});
"#;

/// `arguments[0]`: entry index. Opens the entry's "more actions" menu and
/// returns the trimmed texts of its pause/resume control.
const ENTRY_ACTIONS_BODY: &str = r#"
const item = items[arguments[0]];
if (!item || !item.shadowRoot) {
  return [];
}
const root = item.shadowRoot;
const more = root.querySelector('cr-icon-button[iron-icon="more-vert"]');
if (more) {
  more.click();
}
return Array.from(root.querySelectorAll('#pause-or-resume'))
  .map((control) => control.innerText.trim())
  .filter((text) => text.length > 0);
"#;

/// `arguments[0]`: entry index, `arguments[1]`: control text. Returns whether it was clicked.
const INVOKE_ACTION_BODY: &str = r#"
const item = items[arguments[0]];
if (!item || !item.shadowRoot) {
  return false;
}
const control = Array.from(item.shadowRoot.querySelectorAll('#pause-or-resume'))
  .find((candidate) => candidate.innerText.trim() === arguments[1]);
if (!control) {
  return false;
}
control.click();
return true;
"#;

pub fn list_entries() -> String {
    format!("{STATUS_ITEMS}{LIST_ENTRIES_BODY}")
}

pub fn entry_actions() -> String {
    format!("{STATUS_ITEMS}{ENTRY_ACTIONS_BODY}")
}

pub fn invoke_action() -> String {
    format!("{STATUS_ITEMS}{INVOKE_ACTION_BODY}")
}
