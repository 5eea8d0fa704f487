//! Select primitive - Choose a dropdown option by visible text

use action_locator::ResolvedField;
use cdp_adapter::Cdp;
use formfill_core_types::FieldValue;

use crate::errors::ActionError;

pub async fn execute_select(
    port: &dyn Cdp,
    field: &ResolvedField,
    value: &FieldValue,
) -> Result<bool, ActionError> {
    let text = value.as_text().ok_or_else(|| {
        ActionError::InvalidValue(format!(
            "cannot select a {} in '{}'",
            value.kind_name(),
            field.key
        ))
    })?;

    let current = port
        .inspect(&field.element.handle)
        .await?
        .ok_or_else(|| ActionError::StaleElement(format!("'{}' left the page", field.key)))?;
    port.select_by_text(&field.element.handle, &text).await?;
    Ok(current.value != text)
}
