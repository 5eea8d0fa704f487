//! `Runtime.evaluate` expressions used by [`crate::CdpAdapter`].
//!
//! Every lookup tags the matched elements with a marker attribute and returns a
//! selector on that marker, so later commands address exactly the element that
//! was inspected.

use formfill_core_types::{Locator, LocatorStrategy};

use crate::error::{AdapterError, AdapterErrorKind};

pub(crate) const MARKER_ATTR: &str = "data-formfill-anchor";

const SNAPSHOT_FN: &str = r#"
    const snapshot = (el, selector) => {
        const style = window.getComputedStyle(el);
        const rect = el.getBoundingClientRect();
        const visible = style.visibility !== 'hidden'
            && style.display !== 'none'
            && (rect.width > 0 || rect.height > 0 || el.getClientRects().length > 0);
        return {
            selector,
            tag: (el.tagName || '').toLowerCase(),
            inputType: el.getAttribute('type'),
            visible,
            enabled: !el.disabled && !el.hasAttribute('readonly'),
            value: typeof el.value === 'string' ? el.value : '',
            checked: !!el.checked,
        };
    };
"#;

pub(crate) fn literal(value: &str) -> Result<String, AdapterError> {
    serde_json::to_string(value).map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal)
            .with_hint(format!("invalid script literal: {err}"))
    })
}

/// Expression yielding the array of elements a locator matches.
fn finder(locator: &Locator) -> Result<String, AdapterError> {
    let value = literal(&locator.value)?;
    Ok(match locator.strategy {
        LocatorStrategy::Css => format!("Array.from(document.querySelectorAll({value}))"),
        LocatorStrategy::Id => format!("[document.getElementById({value})].filter(Boolean)"),
        LocatorStrategy::Name => format!("Array.from(document.getElementsByName({value}))"),
        LocatorStrategy::Label => format!(
            "Array.from(document.querySelectorAll('label'))\
             .filter(l => (l.textContent || '').includes({value}))\
             .map(l => l.nextElementSibling)\
             .filter(Boolean)"
        ),
        LocatorStrategy::Placeholder => format!(
            "Array.from(document.querySelectorAll('[placeholder]'))\
             .filter(el => el.getAttribute('placeholder') === {value})"
        ),
    })
}

/// Locate elements; with `all == false` only the first match is reported.
pub(crate) fn locate(locator: &Locator, token: &str, all: bool) -> Result<String, AdapterError> {
    let find = finder(locator)?;
    let attr = literal(MARKER_ATTR)?;
    let token = literal(token)?;
    let limit = if all { "found.length" } else { "Math.min(found.length, 1)" };
    Ok(format!(
        r#"(() => {{
    {SNAPSHOT_FN}
    let found;
    try {{
        found = {find};
    }} catch (err) {{
        return {{ status: 'error', message: String(err) }};
    }}
    const attr = {attr};
    const elements = [];
    for (let i = 0; i < {limit}; i++) {{
        const mark = {token} + '-' + i;
        found[i].setAttribute(attr, mark);
        elements.push(snapshot(found[i], '[' + attr + '="' + mark + '"]'));
    }}
    return {{ status: 'ok', elements }};
}})()"#
    ))
}

pub(crate) fn inspect(selector: &str) -> Result<String, AdapterError> {
    let selector = literal(selector)?;
    Ok(format!(
        r#"(() => {{
    {SNAPSHOT_FN}
    const el = document.querySelector({selector});
    if (!el) {{ return {{ status: 'not-found', elements: [] }}; }}
    return {{ status: 'ok', elements: [snapshot(el, {selector})] }};
}})()"#
    ))
}

/// Runs `body` with `el` bound to the addressed element.
fn on_element(selector: &str, body: &str) -> Result<String, AdapterError> {
    let selector = literal(selector)?;
    Ok(format!(
        r#"(() => {{
    const el = document.querySelector({selector});
    if (!el) {{ return {{ status: 'not-found' }}; }}
    try {{
        {body}
    }} catch (err) {{
        return {{ status: 'error', message: String(err) }};
    }}
}})()"#
    ))
}

pub(crate) fn clear(selector: &str) -> Result<String, AdapterError> {
    on_element(
        selector,
        "if (typeof el.focus === 'function') { el.focus(); }
        el.value = '';
        el.dispatchEvent(new Event('input', { bubbles: true }));
        return { status: 'ok' };",
    )
}

pub(crate) fn focus(selector: &str) -> Result<String, AdapterError> {
    on_element(
        selector,
        "if (typeof el.focus === 'function') { el.focus(); }
        return { status: 'ok' };",
    )
}

/// Fired after `Input.insertText` so change handlers (and postbacks) run.
pub(crate) fn commit(selector: &str) -> Result<String, AdapterError> {
    on_element(
        selector,
        "el.dispatchEvent(new Event('change', { bubbles: true }));
        if (typeof el.blur === 'function') { el.blur(); }
        return { status: 'ok' };",
    )
}

pub(crate) fn click(selector: &str) -> Result<String, AdapterError> {
    on_element(selector, "el.click();\n        return { status: 'ok' };")
}

pub(crate) fn select_by_text(selector: &str, text: &str) -> Result<String, AdapterError> {
    let text = literal(text)?;
    on_element(
        selector,
        &format!(
            "const target = {text};
        const option = Array.from(el.options || []).find(opt => (opt.text || '').trim() === target);
        if (!option) {{ return {{ status: 'option-missing' }}; }}
        if (el.value !== option.value) {{
            el.value = option.value;
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
        }}
        return {{ status: 'ok' }};"
        ),
    )
}

pub(crate) const AJAX_IDLE: &str = "(window.jQuery != undefined) && (jQuery.active == 0)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finder_quotes_values() {
        let expr = finder(&Locator::placeholder("it's \"quoted\"")).unwrap();
        assert!(expr.contains(r#""it's \"quoted\"""#));
    }

    #[test]
    fn locate_first_limits_to_one() {
        let expr = locate(&Locator::css("input[name$='x']"), "tok", false).unwrap();
        assert!(expr.contains("Math.min(found.length, 1)"));
        assert!(expr.contains("document.querySelectorAll(\"input[name$='x']\")"));
        assert!(expr.contains(MARKER_ATTR));
    }

    #[test]
    fn label_finder_uses_following_sibling() {
        let expr = finder(&Locator::label("Postcode")).unwrap();
        assert!(expr.contains("nextElementSibling"));
    }
}
