//! Gravity Forms admin console driven through WebDriver.
//!
//! Pages are reached by URL rather than by clicking through menus, and every
//! control lookup is polled through a [`LocatorChain`] so slow admin pages do
//! not fail a step outright.

use std::collections::HashSet;

use leadrouter_app::ports::FormSurface;
use leadrouter_domain::error::SurfaceError;
use leadrouter_domain::form::{FormId, FormRef};
use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::slot::{RuleSlot, SlotField, ValueControl};
use serde_json::Value;

use crate::config::WebDriverConfig;
use crate::error::WebDriverError;
use crate::locator::{Locator, LocatorChain, xpath_literal};
use crate::session::{ElementRef, Session};
use crate::wait::Poller;

const FORM_LINKS: &str = "//a[contains(@href, 'page=gf_edit_forms') and contains(@href, 'id=') and not(contains(@href, 'view='))]";
const FORM_LINKS_IN_TABLE: &str = "//table//a[contains(@href, 'id=') and not(contains(@href, 'view='))]";
const ADD_SLOT_LINKS: &str = "//a[contains(@onclick,'InsertRouting')]";
const SAVE_CONTROL: &str = "//input[@type='submit' and (@value='Update Notification' or @value='Save Notification')]";
const ROUTING_RADIO: &str = "gform_notification_to_type_routing";

const READY_STATE: &str = "return document.readyState;";
const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";
const SCRIPT_CLICK: &str = "arguments[0].click();";
const SELECT_OPTIONS: &str =
    "return Array.from(arguments[0].options).map((o) => o.text.trim()).filter((t) => t.length > 0);";
const CONTROL_VALUE: &str = r"
const el = arguments[0];
if (el.tagName.toLowerCase() === 'select') {
  const o = el.options[el.selectedIndex];
  return o ? o.text.trim() : '';
}
return (el.value || '').trim();
";
const SELECT_BY_TEXT: &str = r"
const [el, text] = arguments;
const i = Array.from(el.options).findIndex((o) => o.text.trim() === text);
if (i < 0) { return false; }
el.selectedIndex = i;
el.dispatchEvent(new Event('change', { bubbles: true }));
return true;
";
const ROUTING_SLOTS: &str = r"
const read = (el) => {
  if (!el) { return ''; }
  if (el.tagName.toLowerCase() === 'select') {
    const o = el.options[el.selectedIndex];
    return o ? o.text.trim() : '';
  }
  return (el.value || '').trim();
};
return Array.from(document.querySelectorAll(`[id^='routing_email_']`))
  .map((email) => {
    const index = parseInt(email.id.slice('routing_email_'.length), 10);
    const get = (name) => read(document.getElementById(`${name}_${index}`));
    return {
      index,
      email_value: read(email),
      match_field: get('routing_field_id'),
      match_operator: get('routing_operator'),
      match_value: get('routing_value'),
    };
  })
  .filter((slot) => !Number.isNaN(slot.index));
";

/// DOM id of the control holding `field` for slot `index`.
fn control_id(index: usize, field: SlotField) -> String {
    let prefix = match field {
        SlotField::Email => "routing_email",
        SlotField::MatchField => "routing_field_id",
        SlotField::MatchOperator => "routing_operator",
        SlotField::MatchValue => "routing_value",
    };
    format!("{prefix}_{index}")
}

/// Extract the numeric form id from an admin link.
fn form_id_from_href(href: &str) -> Option<&str> {
    let (_, query) = href.split_once('?')?;
    query.split('&').find_map(|pair| {
        let value = pair.strip_prefix("id=")?;
        (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())).then_some(value)
    })
}

/// Alternatives for the link that opens a notification's editor.
fn notification_link(kind: NotificationKind) -> LocatorChain {
    let title = xpath_literal(kind.title());
    LocatorChain::new(
        format!("{kind} link"),
        vec![
            Locator::xpath(format!("//a[strong[text()={title}]]")),
            Locator::xpath(format!("//strong[text()={title}]/parent::a")),
            Locator::xpath(format!(
                "//a[contains(@href, 'notification') and contains(., {title})]"
            )),
            Locator::xpath(format!("//a[strong[contains(text(), {title})]]")),
            Locator::xpath(format!("//strong[contains(text(), {title})]/parent::a")),
        ],
    )
}

/// The Gravity Forms console of one WordPress site.
#[derive(Debug, Clone)]
pub struct GravityFormsConsole {
    session: Session,
    site_url: String,
    poller: Poller,
}

impl GravityFormsConsole {
    #[must_use]
    pub fn new(session: Session, site_url: &str, poller: Poller) -> Self {
        Self {
            session,
            site_url: site_url.trim_end_matches('/').to_string(),
            poller,
        }
    }

    /// Start a browser session for the site at `site_url`.
    ///
    /// # Errors
    ///
    /// Returns a [`WebDriverError`] when the WebDriver server cannot start
    /// a session.
    pub async fn connect(site_url: &str, config: &WebDriverConfig) -> Result<Self, WebDriverError> {
        let session = Session::start(&config.webdriver_url, config.capabilities()).await?;
        Ok(Self::new(session, site_url, config.poller()))
    }

    /// The WordPress admin page the operator logs in through.
    #[must_use]
    pub fn admin_url(&self) -> String {
        format!("{}/wp/wp-admin/", self.site_url)
    }

    fn active_forms_url(&self) -> String {
        format!(
            "{}/wp/wp-admin/admin.php?page=gf_edit_forms&active=1",
            self.site_url
        )
    }

    fn form_url(&self, form_id: &FormId) -> String {
        format!(
            "{}/wp/wp-admin/admin.php?page=gf_edit_forms&id={form_id}",
            self.site_url
        )
    }

    fn notifications_url(&self, form_id: &FormId) -> String {
        format!(
            "{}/wp/wp-admin/admin.php?page=gf_edit_forms&view=settings&subview=notification&id={form_id}",
            self.site_url
        )
    }

    /// Show the admin login page to the operator.
    ///
    /// # Errors
    ///
    /// Returns a [`WebDriverError`] if the browser cannot navigate.
    pub async fn open_admin(&self) -> Result<(), WebDriverError> {
        self.session.navigate(&self.admin_url()).await
    }

    /// End the browser session.
    ///
    /// # Errors
    ///
    /// Returns a [`WebDriverError`] if the driver rejects the request.
    pub async fn quit(&self) -> Result<(), WebDriverError> {
        self.session.quit().await
    }

    async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        self.session.navigate(url).await?;
        let session = &self.session;
        self.poller
            .until("page load", move || async move {
                let state = session.execute(READY_STATE, Vec::new()).await?;
                Ok((state.as_str() == Some("complete")).then_some(()))
            })
            .await
    }

    /// First element matched by any alternative of `chain`, polled until the
    /// timeout.
    async fn wait_for(&self, chain: &LocatorChain) -> Result<ElementRef, WebDriverError> {
        let session = &self.session;
        let alternatives = &chain.alternatives;
        self.poller
            .until(&chain.name, move || async move {
                for locator in alternatives {
                    if let Some(element) = session.find(locator).await? {
                        return Ok(Some(element));
                    }
                }
                Ok(None)
            })
            .await
    }

    async fn wait_for_id(&self, id: &str) -> Result<ElementRef, WebDriverError> {
        self.wait_for(&LocatorChain::single(id, Locator::id(id)))
            .await
    }

    /// Click, falling back to a script click when the element is covered.
    async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        match self.session.click(element).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_session_lost() => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "native click failed, using script click");
                self.session
                    .execute(SCRIPT_CLICK, vec![element.to_json()])
                    .await
                    .map(|_| ())
            }
        }
    }

    async fn select_options(&self, element: &ElementRef) -> Result<Vec<String>, WebDriverError> {
        let value = self
            .session
            .execute(SELECT_OPTIONS, vec![element.to_json()])
            .await?;
        serde_json::from_value(value).map_err(WebDriverError::Decode)
    }

    async fn forms_from_links(&self, xpath: &str) -> Result<Vec<FormRef>, WebDriverError> {
        let links = self.session.find_all(&Locator::xpath(xpath)).await?;
        let mut seen = HashSet::new();
        let mut forms = Vec::new();
        for link in &links {
            let Some(href) = self.session.attribute(link, "href").await? else {
                continue;
            };
            let Some(id) = form_id_from_href(&href) else {
                continue;
            };
            let title = self.session.text(link).await?.trim().to_string();
            if title.is_empty() || !seen.insert(id.to_string()) {
                continue;
            }
            forms.push(FormRef::new(id, title));
        }
        Ok(forms)
    }

    async fn list_forms(&self) -> Result<Vec<FormRef>, WebDriverError> {
        self.navigate(&self.active_forms_url()).await?;
        let forms = self.forms_from_links(FORM_LINKS).await?;
        if !forms.is_empty() {
            return Ok(forms);
        }
        tracing::debug!("no form links found, trying table links");
        self.forms_from_links(FORM_LINKS_IN_TABLE).await
    }

    async fn open_editor(&self, form_id: &FormId, kind: NotificationKind) -> Result<(), WebDriverError> {
        self.navigate(&self.notifications_url(form_id)).await?;
        let link = self.wait_for(&notification_link(kind)).await?;
        self.click(&link).await?;

        let radio = self.wait_for_id(ROUTING_RADIO).await?;
        if self.session.is_selected(&radio).await? {
            tracing::debug!(notification = %kind, "routing already enabled");
        } else {
            tracing::debug!(notification = %kind, "enabling routing");
            self.click(&radio).await?;
        }
        self.wait_for_id(&control_id(0, SlotField::MatchField))
            .await
            .map(|_| ())
    }

    async fn slots(&self) -> Result<Vec<RuleSlot>, WebDriverError> {
        let value = self.session.execute(ROUTING_SLOTS, Vec::new()).await?;
        let mut slots: Vec<RuleSlot> =
            serde_json::from_value(value).map_err(WebDriverError::Decode)?;
        slots.sort_by_key(|slot| slot.index);
        Ok(slots)
    }

    async fn add_slot(&self) -> Result<usize, WebDriverError> {
        let index = self.slots().await?.len();
        let buttons = self
            .session
            .find_all(&Locator::xpath(ADD_SLOT_LINKS))
            .await?;
        let Some(last) = buttons.last() else {
            return Err(WebDriverError::NotFound("add routing rule link".to_string()));
        };
        self.session
            .execute(SCROLL_INTO_VIEW, vec![last.to_json()])
            .await?;
        self.click(last).await?;
        self.wait_for_id(&control_id(index, SlotField::Email)).await?;
        Ok(index)
    }

    async fn control_kind(&self, index: usize) -> Result<ValueControl, WebDriverError> {
        let control = self
            .wait_for_id(&control_id(index, SlotField::MatchValue))
            .await?;
        if self.session.tag_name(&control).await? == "select" {
            let options = self.select_options(&control).await?;
            return Ok(ValueControl::Select { options });
        }
        Ok(ValueControl::FreeText)
    }

    async fn write(&self, index: usize, field: SlotField, value: &str) -> Result<(), WebDriverError> {
        let id = control_id(index, field);
        let control = self.wait_for_id(&id).await?;
        if self.session.tag_name(&control).await? == "select" {
            let chosen = self
                .session
                .execute(
                    SELECT_BY_TEXT,
                    vec![control.to_json(), Value::String(value.to_string())],
                )
                .await?;
            if chosen.as_bool() != Some(true) {
                return Err(WebDriverError::MissingOption {
                    control: id,
                    option: value.to_string(),
                });
            }
            return Ok(());
        }
        self.session.clear(&control).await?;
        self.session.send_keys(&control, value).await
    }

    async fn read(&self, index: usize, field: SlotField) -> Result<String, WebDriverError> {
        let control = self.wait_for_id(&control_id(index, field)).await?;
        let value = self
            .session
            .execute(CONTROL_VALUE, vec![control.to_json()])
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn submit(&self) -> Result<bool, WebDriverError> {
        let Some(button) = self.session.find(&Locator::xpath(SAVE_CONTROL)).await? else {
            return Ok(false);
        };
        self.session
            .execute(SCROLL_INTO_VIEW, vec![button.to_json()])
            .await?;
        self.click(&button).await?;
        let session = &self.session;
        self.poller
            .until("save to complete", move || async move {
                let state = session.execute(READY_STATE, Vec::new()).await?;
                Ok((state.as_str() == Some("complete")).then_some(()))
            })
            .await?;
        Ok(true)
    }
}

impl FormSurface for GravityFormsConsole {
    #[tracing::instrument(skip_all)]
    async fn list_active_forms(&self) -> Result<Vec<FormRef>, SurfaceError> {
        let forms = self.list_forms().await?;
        tracing::info!(count = forms.len(), "active forms listed");
        Ok(forms)
    }

    async fn open_form(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.navigate(&self.form_url(form_id)).await?;
        self.wait_for(&LocatorChain::single(
            "Form Settings link",
            Locator::link_text("Form Settings"),
        ))
        .await?;
        Ok(())
    }

    async fn open_notifications(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.navigate(&self.notifications_url(form_id)).await?;
        self.wait_for(&LocatorChain::single(
            "Notifications link",
            Locator::link_text("Notifications"),
        ))
        .await?;
        Ok(())
    }

    async fn open_notification(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
    ) -> Result<(), SurfaceError> {
        Ok(self.open_editor(form_id, kind).await?)
    }

    async fn routing_field_options(&self) -> Result<Vec<String>, SurfaceError> {
        let control = self
            .wait_for_id(&control_id(0, SlotField::MatchField))
            .await?;
        Ok(self.select_options(&control).await?)
    }

    async fn rule_slots(&self) -> Result<Vec<RuleSlot>, SurfaceError> {
        Ok(self.slots().await?)
    }

    async fn create_rule_slot(&self) -> Result<usize, SurfaceError> {
        Ok(self.add_slot().await?)
    }

    async fn value_control(&self, index: usize) -> Result<ValueControl, SurfaceError> {
        Ok(self.control_kind(index).await?)
    }

    async fn write_slot_field(
        &self,
        index: usize,
        field: SlotField,
        value: &str,
    ) -> Result<(), SurfaceError> {
        Ok(self.write(index, field, value).await?)
    }

    async fn read_slot_field(&self, index: usize, field: SlotField) -> Result<String, SurfaceError> {
        Ok(self.read(index, field).await?)
    }

    async fn save(&self) -> Result<bool, SurfaceError> {
        Ok(self.submit().await?)
    }

    async fn return_to_form_list(&self) -> Result<(), SurfaceError> {
        Ok(self.navigate(&self.active_forms_url()).await?)
    }
}
