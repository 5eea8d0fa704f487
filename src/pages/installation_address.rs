use formfill_core_types::FieldValue;
use tracing::info;

use super::PageContext;
use crate::errors::{FormFillError, FormFillResult};
use crate::field_map::InstallationAddressLayout;
use crate::payload::{present, AddressBlock, Section};

const SECTION: &str = "installationAddress";

/// Page 2. The address block is only entered when the registered address
/// is reported as incorrect.
pub async fn fill_installation_address(
    ctx: &mut PageContext,
    layout: &InstallationAddressLayout,
    section: &Section,
) -> FormFillResult<()> {
    info!("Filling installation address");
    ctx.wait_ready(&layout.address_correct).await?;

    let correct = match present(section, "isAddressCorrect") {
        None => false,
        Some(value) => value.as_flag().ok_or_else(|| {
            FormFillError::Payload(format!(
                "{SECTION}.isAddressCorrect must be a boolean, got {}",
                value.kind_name()
            ))
        })?,
    };
    let address = if correct {
        None
    } else {
        let block = AddressBlock::from_section(section, SECTION)?
            .ok_or_else(|| FormFillError::MissingPayload(format!("{SECTION}.address")))?;
        Some(block)
    };

    ctx.fill(&layout.address_correct, &FieldValue::Flag(correct)).await;

    if let Some(address) = &address {
        ctx.fill_address(&layout.address, address).await?;
    }

    info!(stats = %ctx.stats(), correct, "Installation address done");
    Ok(())
}
