use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::WidgetConfig;
use crate::dom::Document;
use crate::html;
use crate::observe::{AttributeSource, Subscription};
use crate::theme::Theme;

/// One render of the embedded widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmbed {
    /// Starts at 1 for the initial render.
    pub revision: usize,
    pub theme: Theme,
    pub markup: String,
}

type RenderSink = Box<dyn FnMut(&RenderedEmbed)>;

struct WidgetState {
    config: Rc<WidgetConfig>,
    theme: Theme,
    revision: usize,
    sink: RenderSink,
}

impl WidgetState {
    fn render(&mut self) {
        self.revision += 1;
        let rendered = RenderedEmbed {
            revision: self.revision,
            theme: self.theme.clone(),
            markup: html::render_embed(&self.config, &self.theme).into_string(),
        };
        tracing::debug!(revision = self.revision, theme = %self.theme, "render comment widget");
        (self.sink)(&rendered);
    }

    fn apply(&mut self, next: Theme) {
        if next == self.theme {
            tracing::trace!(theme = %next, "theme unchanged; skipping render");
            return;
        }
        tracing::info!(from = %self.theme, to = %next, "theme changed");
        self.theme = next;
        self.render();
    }
}

pub struct ThemeSyncedCommentWidget {
    state: Rc<RefCell<WidgetState>>,
    attribute: String,
    subscription: Subscription,
}

impl ThemeSyncedCommentWidget {
    /// Mounts on the document's root element. Fails when the document has no
    /// root element.
    pub fn mount_on(
        document: &Document,
        attribute: &str,
        config: Rc<WidgetConfig>,
        sink: impl FnMut(&RenderedEmbed) + 'static,
    ) -> anyhow::Result<Self> {
        let root = document.document_element()?;
        Ok(Self::mount(&root, attribute, config, sink))
    }

    /// Mounts on any attribute source and performs the initial render.
    pub fn mount<S>(
        source: &S,
        attribute: &str,
        config: Rc<WidgetConfig>,
        sink: impl FnMut(&RenderedEmbed) + 'static,
    ) -> Self
    where
        S: AttributeSource + Clone + 'static,
    {
        let initial = Theme::from_attribute(source.read(attribute).as_deref());
        let state = Rc::new(RefCell::new(WidgetState {
            config,
            theme: initial,
            revision: 0,
            sink: Box::new(sink),
        }));

        // Subscribe before the first render so the guard is already owned if
        // rendering unwinds.
        let subscription = source.subscribe(
            attribute,
            Box::new(change_handler(
                Rc::downgrade(&state),
                source.clone(),
                attribute.to_string(),
            )),
        );
        let widget = Self {
            state,
            attribute: attribute.to_string(),
            subscription,
        };
        tracing::info!(
            attribute = %widget.attribute,
            theme = %widget.theme(),
            "comment widget mounted"
        );
        widget.state.borrow_mut().render();
        widget
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme.clone()
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Number of renders so far, including the initial one.
    pub fn render_count(&self) -> usize {
        self.state.borrow().revision
    }

    pub fn current_markup(&self) -> String {
        let state = self.state.borrow();
        html::render_embed(&state.config, &state.theme).into_string()
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn unmount(self) {
        tracing::info!(attribute = %self.attribute, "comment widget unmounted");
        self.subscription.release();
    }
}

fn change_handler<S>(state: Weak<RefCell<WidgetState>>, source: S, attribute: String) -> impl Fn()
where
    S: AttributeSource + 'static,
{
    move || {
        let Some(state) = state.upgrade() else {
            return;
        };
        let next = Theme::from_attribute(source.read(&attribute).as_deref());
        state.borrow_mut().apply(next);
    }
}
