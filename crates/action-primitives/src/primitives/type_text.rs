//! Type text primitive - Clear and type into text controls

use action_locator::ResolvedField;
use cdp_adapter::Cdp;
use formfill_core_types::FieldValue;
use tracing::debug;

use crate::errors::ActionError;

/// Replace the control's content with the text form of `value`.
///
/// `null` clears the control. Returns whether the content changed.
pub async fn execute_type_text(
    port: &dyn Cdp,
    field: &ResolvedField,
    value: &FieldValue,
) -> Result<bool, ActionError> {
    let text = match value {
        FieldValue::Empty => String::new(),
        other => other
            .as_text()
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                ActionError::InvalidValue(format!(
                    "cannot type a {} into '{}'",
                    other.kind_name(),
                    field.key
                ))
            })?,
    };

    let handle = &field.element.handle;
    let before = port
        .inspect(handle)
        .await?
        .ok_or_else(|| ActionError::StaleElement(format!("'{}' left the page", field.key)))?;

    port.clear(handle).await?;
    if !text.is_empty() {
        debug!(key = %field.key, text_length = text.len(), "Typing text");
        port.type_text(handle, &text).await?;
    }
    Ok(before.value != text)
}
