//! Organization, external-menu, and menu-tree endpoints.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::client::IikoClient;
use crate::error::IikoError;
use crate::types::{ExternalMenu, MenuTree, Organization};

impl IikoClient {
    /// Lists the organizations visible to the current token.
    ///
    /// # Errors
    ///
    /// - [`IikoError::Precondition`] if called before authentication.
    /// - [`IikoError::Upstream`] on transport failure, non-2xx status, or a
    ///   response without a list-typed `organizations` field.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, IikoError> {
        const STEP: &str = "organizations";
        let token = self.require_token("list_organizations")?;
        let body = self
            .post_json(STEP, "api/1/organizations", &json!({}), Some(token))
            .await?;

        let organizations: Vec<Organization> = take_list(STEP, body, "organizations")?;
        tracing::info!(count = organizations.len(), "fetched organizations");
        Ok(organizations)
    }

    /// Lists the external menus configured for `organization_id`.
    ///
    /// # Errors
    ///
    /// - [`IikoError::Precondition`] if called before authentication.
    /// - [`IikoError::Upstream`] on transport failure, non-2xx status, or a
    ///   response without a list-typed `externalMenus` field.
    pub async fn list_external_menus(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ExternalMenu>, IikoError> {
        const STEP: &str = "external_menus";
        let token = self.require_token("list_external_menus")?;
        let body = self
            .post_json(
                STEP,
                "api/2/menu",
                &json!({ "organizationId": organization_id }),
                Some(token),
            )
            .await?;

        let menus: Vec<ExternalMenu> = take_list(STEP, body, "externalMenus")?;
        tracing::info!(
            organization_id,
            count = menus.len(),
            "fetched external menus"
        );
        Ok(menus)
    }

    /// Fetches the full category/item tree of one external menu.
    ///
    /// `organizationIds` is always sent as a one-element list.
    ///
    /// # Errors
    ///
    /// - [`IikoError::Precondition`] if called before authentication.
    /// - [`IikoError::Upstream`] on transport failure, non-2xx status, or a
    ///   response without a list-typed `itemCategories` field.
    pub async fn fetch_menu_tree(
        &self,
        external_menu_id: &str,
        organization_id: &str,
    ) -> Result<MenuTree, IikoError> {
        const STEP: &str = "menu_by_id";
        let token = self.require_token("fetch_menu_tree")?;
        let body = self
            .post_json(
                STEP,
                "api/2/menu/by_id",
                &json!({
                    "externalMenuId": external_menu_id,
                    "organizationIds": [organization_id],
                }),
                Some(token),
            )
            .await?;

        require_list_field(STEP, &body, "itemCategories")?;
        let tree: MenuTree = serde_json::from_value(body)
            .map_err(|e| IikoError::upstream(STEP, format!("menu tree does not decode: {e}")))?;

        tracing::info!(
            external_menu_id,
            categories = tree.item_categories.as_ref().map_or(0, Vec::len),
            "fetched menu tree"
        );
        Ok(tree)
    }
}

/// Picks the external menu whose name equals `name` exactly.
///
/// The first match wins; iiko does not enforce unique menu names, so
/// duplicates resolve by response order.
#[must_use]
pub fn select_external_menu<'a>(menus: &'a [ExternalMenu], name: &str) -> Option<&'a ExternalMenu> {
    let mut matches = menus.iter().filter(|m| m.name == name);
    let selected = matches.next();
    if selected.is_some() && matches.next().is_some() {
        tracing::warn!(menu_name = name, "multiple external menus share this name; using the first");
    }
    selected
}

fn require_list_field(step: &'static str, body: &Value, field: &str) -> Result<(), IikoError> {
    if body.get(field).is_some_and(Value::is_array) {
        Ok(())
    } else {
        Err(IikoError::upstream(
            step,
            format!("response has no '{field}' list: {body}"),
        ))
    }
}

fn take_list<T: DeserializeOwned>(
    step: &'static str,
    mut body: Value,
    field: &str,
) -> Result<Vec<T>, IikoError> {
    require_list_field(step, &body, field)?;
    let list = body
        .get_mut(field)
        .map(Value::take)
        .unwrap_or_default();
    serde_json::from_value(list)
        .map_err(|e| IikoError::upstream(step, format!("'{field}' entries do not decode: {e}")))
}
