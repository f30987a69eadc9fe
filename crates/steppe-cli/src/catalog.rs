//! `steppe orgs` and `steppe menus`: read-only views of the iiko catalog.

use steppe_core::AppConfig;
use steppe_iiko::{ExternalMenu, Organization};

pub(crate) async fn run_orgs(config: &AppConfig) -> anyhow::Result<()> {
    let api_key = config.iiko_api_key()?;
    let mut client = steppe_sync::client_from_config(config)?;
    client.authenticate(&api_key).await?;

    let organizations = client.list_organizations().await?;
    if organizations.is_empty() {
        println!("no organizations visible to this API key");
    }
    for org in &organizations {
        println!("{}", org_line(org));
    }
    Ok(())
}

pub(crate) async fn run_menus(config: &AppConfig) -> anyhow::Result<()> {
    let target = config.sync_target()?;
    let mut client = steppe_sync::client_from_config(config)?;
    client.authenticate(&target.api_key).await?;

    let menus = client.list_external_menus(&target.organization_id).await?;
    if menus.is_empty() {
        println!("organization {} has no external menus", target.organization_id);
    }
    for menu in &menus {
        println!("{}", menu_line(menu, &target.menu_name));
    }
    Ok(())
}

fn org_line(org: &Organization) -> String {
    format!("{}  {}", org.name, org.id)
}

/// Marks the menu that `steppe sync` would select with `*`.
fn menu_line(menu: &ExternalMenu, target_name: &str) -> String {
    let marker = if menu.name == target_name { '*' } else { ' ' };
    format!("{marker} {}  {}", menu.name, menu.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_line_is_name_then_id() {
        let org = Organization {
            id: "390df300".to_string(),
            name: "Steppe Coffee".to_string(),
        };
        assert_eq!(org_line(&org), "Steppe Coffee  390df300");
    }

    #[test]
    fn menu_line_marks_target() {
        let menu = ExternalMenu {
            id: "200".to_string(),
            name: "Steppe App Menu".to_string(),
        };
        assert_eq!(menu_line(&menu, "Steppe App Menu"), "* Steppe App Menu  200");
        assert_eq!(menu_line(&menu, "Bar"), "  Steppe App Menu  200");
    }
}
