//! Click primitive - Checkboxes, radio options and buttons

use action_locator::ResolvedField;
use cdp_adapter::{Cdp, ElementInfo};
use formfill_core_types::{FieldValue, ValueEncoding};
use tracing::debug;

use crate::errors::ActionError;

/// Bring a checkbox to the desired state; clicks only when it differs.
pub async fn execute_toggle(
    port: &dyn Cdp,
    field: &ResolvedField,
    value: &FieldValue,
) -> Result<bool, ActionError> {
    let desired = value.as_flag().ok_or_else(|| {
        ActionError::InvalidValue(format!(
            "checkbox '{}' needs a boolean, got {}",
            field.key,
            value.kind_name()
        ))
    })?;

    let current = port
        .inspect(&field.element.handle)
        .await?
        .ok_or_else(|| ActionError::StaleElement(format!("'{}' left the page", field.key)))?;
    if current.checked == desired {
        return Ok(false);
    }
    port.click(&field.element.handle).await?;
    Ok(true)
}

/// Check the radio option whose `value` attribute is the encoded payload
/// value; an already checked option is left alone.
pub async fn execute_choose_option(
    port: &dyn Cdp,
    field: &ResolvedField,
    encoding: &ValueEncoding,
    value: &FieldValue,
) -> Result<bool, ActionError> {
    let option = encoding.encode(value)?;
    let options = port.locate_all(&field.group).await?;
    let target = options
        .into_iter()
        .find(|candidate| candidate.value == option)
        .ok_or_else(|| {
            ActionError::OptionNotFound(format!(
                "no option '{option}' for '{}' ({})",
                field.key, field.group
            ))
        })?;

    if target.checked {
        debug!(key = %field.key, option = %option, "Option already checked");
        return Ok(false);
    }
    port.click(&target.handle).await?;
    Ok(true)
}

/// Press a control such as a "next" button.
pub async fn execute_click(port: &dyn Cdp, element: &ElementInfo) -> Result<(), ActionError> {
    if !element.is_clickable() {
        return Err(ActionError::Internal(format!(
            "element {} is not clickable",
            element.handle
        )));
    }
    port.click(&element.handle).await?;
    Ok(())
}
