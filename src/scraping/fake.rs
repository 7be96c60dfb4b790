//! Scriptable in-memory renderer for pipeline tests.

use std::{cell::Cell, collections::HashMap, rc::Rc, time::Duration};

use super::{Authenticate, Element, PageRenderer, RenderError, WaitCondition};
use crate::facebook::{Credentials, LoginError};

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<String, Vec<Element>>,
    // Revealed one per scroll, in order.
    lazy: Vec<(String, Element)>,
}

impl FakePage {
    pub fn with(mut self, selector: &str, element: Element) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    pub fn without(mut self, selector: &str) -> Self {
        self.elements.remove(selector);
        self
    }

    pub fn with_lazy(mut self, selector: &str, element: Element) -> Self {
        self.lazy.push((selector.to_string(), element));
        self
    }
}

/// Session state shared with the test after the renderer has been moved.
#[derive(Debug, Clone, Default)]
pub struct SessionFlags {
    closed: Rc<Cell<bool>>,
    logged_in: Rc<Cell<bool>>,
}

impl SessionFlags {
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.get()
    }
}

#[derive(Debug, Default)]
pub struct FakeRenderer {
    pages: HashMap<String, FakePage>,
    blank: FakePage,
    current: Option<String>,
    scrolls: usize,
    pub navigations: Vec<String>,
    pub total_scrolls: usize,
    flags: SessionFlags,
}

impl FakeRenderer {
    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn flags(&self) -> SessionFlags {
        self.flags.clone()
    }

    fn page(&self) -> Result<&FakePage, RenderError> {
        let url = self.current.as_ref().ok_or(RenderError::NoPage)?;
        // Unknown URLs behave like a blank page that never renders anything.
        Ok(self.pages.get(url).unwrap_or(&self.blank))
    }
}

impl PageRenderer for FakeRenderer {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        if self.flags.is_closed() {
            return Err(RenderError::Session("session closed".to_string()));
        }
        self.navigations.push(url.to_string());
        self.current = Some(url.to_string());
        self.scrolls = 0;
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn wait_for(
        &mut self,
        selector: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let matches = self.query_all(selector)?;
        let ready = match condition {
            WaitCondition::Present => !matches.is_empty(),
            WaitCondition::Visible => matches.iter().any(Element::is_visible),
        };
        if ready {
            Ok(())
        } else {
            Err(RenderError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.page()?;
        self.scrolls += 1;
        self.total_scrolls += 1;
        Ok(())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        let page = self.page()?;
        let mut found = page.elements.get(selector).cloned().unwrap_or_default();
        found.extend(
            page.lazy
                .iter()
                .take(self.scrolls)
                .filter(|(lazy_selector, _)| lazy_selector == selector)
                .map(|(_, element)| element.clone()),
        );
        Ok(found)
    }

    fn close(&mut self) -> Result<(), RenderError> {
        self.flags.closed.set(true);
        self.current = None;
        Ok(())
    }
}

impl Authenticate for FakeRenderer {
    fn login(&mut self, credentials: &Credentials) -> Result<(), LoginError> {
        if credentials.password == "wrong" {
            return Err(LoginError::Rejected);
        }
        self.flags.logged_in.set(true);
        Ok(())
    }
}
