use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::base;
use super::{Authenticate, Element, PageRenderer, RenderError, WaitCondition};
use crate::facebook::{Credentials, LoginError};

const LOGIN_URL: &str = "https://www.facebook.com/login.php";

struct LoadedPage {
    url: String,
    document: Html,
}

/// [`PageRenderer`] over plain HTTP: pages are fetched once and queried as
/// static documents. Nothing renders after load, so waits resolve on the
/// first check and scrolling has no effect.
pub struct HttpRenderer {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpRenderer {
    pub fn new(user_agent: &str) -> Result<Self, RenderError> {
        Ok(Self {
            client: base::build_client(user_agent)?,
            page: None,
        })
    }

    pub(crate) fn load_html(&mut self, url: &str, html: &str) {
        self.page = Some(LoadedPage {
            url: url.to_string(),
            document: Html::parse_document(html),
        });
    }

    fn document(&self) -> Result<&LoadedPage, RenderError> {
        self.page.as_ref().ok_or(RenderError::NoPage)
    }

    fn hidden_inputs(&self, form: &str) -> Result<Vec<(String, String)>, RenderError> {
        let selector = format!("{form} input[type=hidden]");
        Ok(self
            .query_all(&selector)?
            .into_iter()
            .filter_map(|input| {
                let name = input.attr("name")?.to_string();
                let value = input.attr("value").unwrap_or_default().to_string();
                Some((name, value))
            })
            .collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|err| RenderError::InvalidSelector {
        selector: selector.to_string(),
        reason: err.to_string(),
    })
}

fn is_hidden(node: ElementRef<'_>) -> bool {
    let value = node.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value
        .attr("style")
        .map(|style| style.replace(' ', "").contains("display:none"))
        .unwrap_or(false)
}

fn snapshot(node: ElementRef<'_>) -> Element {
    let mut element = node
        .value()
        .attrs()
        .fold(Element::new(base::inner_text(node)), |element, (name, value)| {
            element.with_attr(name, value)
        });
    if is_hidden(node) {
        element = element.hidden();
    }
    element
}

impl PageRenderer for HttpRenderer {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        debug!(%url, "fetching page");
        let (final_url, body) = base::fetch_html(&self.client, url)?;
        self.load_html(&final_url, &body);
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|page| page.url.as_str())
    }

    fn wait_for(
        &mut self,
        selector: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let matches = self.query_all(selector)?;
        let satisfied = match condition {
            WaitCondition::Present => !matches.is_empty(),
            WaitCondition::Visible => matches.iter().any(Element::is_visible),
        };
        if satisfied {
            Ok(())
        } else {
            Err(RenderError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.document().map(|_| ())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        let page = self.document()?;
        let selector = parse_selector(selector)?;
        Ok(page.document.select(&selector).map(snapshot).collect())
    }

    fn close(&mut self) -> Result<(), RenderError> {
        self.page = None;
        Ok(())
    }
}

impl Authenticate for HttpRenderer {
    fn login(&mut self, credentials: &Credentials) -> Result<(), LoginError> {
        self.navigate(LOGIN_URL)?;
        let mut form = self.hidden_inputs("form#login_form")?;
        form.push(("email".to_string(), credentials.email.clone()));
        form.push(("pass".to_string(), credentials.password.clone()));

        let action = self
            .query("form#login_form")?
            .and_then(|el| base::absolute_url(LOGIN_URL, el.attr("action")))
            .unwrap_or_else(|| LOGIN_URL.to_string());

        let response = self
            .client
            .post(&action)
            .form(&form)
            .send()
            .map_err(|err| LoginError::Http(err.to_string()))?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .map_err(|err| LoginError::Http(err.to_string()))?;
        if !status.is_success() {
            return Err(LoginError::Http(format!("login returned {status}")));
        }
        self.load_html(&final_url, &body);
        self.check_login_result()
    }
}

impl HttpRenderer {
    fn check_login_result(&self) -> Result<(), LoginError> {
        if self.query("#approvals_code")?.is_some() {
            return Err(LoginError::CheckpointRequired);
        }
        if self.query("#loginbutton")?.is_some() {
            return Err(LoginError::Rejected);
        }
        Ok(())
    }
}
