//! Page-level registry of mask instances.
//!
//! Each mask keeps its own slots, navigator and callback under a [`MaskId`];
//! the registry only routes host events to the right instance. Events for ids
//! that are not (or no longer) registered are ignored.

use crate::format::FormatDefinition;
use crate::host::TextCursorHost;
use crate::id::MaskId;
use crate::keys::KeyEvent;
use crate::parser::MaskParser;
use crate::rules::KeyOutcome;
use std::collections::HashMap;

/// Owns every live [`MaskParser`] on a page.
///
/// # Example
///
/// ```
/// use mask_core::{FormatPreset, KeyEvent, MaskRegistry, StringHost};
///
/// let mut registry = MaskRegistry::new();
/// let id = registry.create(FormatPreset::Hour24.definition());
/// let mut host = StringHost::new();
/// host.set_focused(true);
/// registry.attach_host(id, host);
///
/// for key in ["0", "9", "3", "0"] {
///     registry.on_key_down(id, &KeyEvent::new(key));
/// }
/// assert_eq!(registry.get(id).and_then(|m| m.value()).as_deref(), Some("09:30"));
/// ```
pub struct MaskRegistry<H> {
    masks: HashMap<MaskId, MaskParser<H>>,
}

impl<H> Default for MaskRegistry<H> {
    fn default() -> Self {
        Self {
            masks: HashMap::new(),
        }
    }
}

impl<H: TextCursorHost> MaskRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parser for `definition` under a fresh id.
    pub fn create(&mut self, definition: FormatDefinition) -> MaskId {
        self.insert(MaskParser::new(definition))
    }

    /// Take ownership of an already configured parser (e.g. one with a
    /// change callback).
    pub fn insert(&mut self, parser: MaskParser<H>) -> MaskId {
        let id = parser.id();
        log::debug!(target: "mask.registry", "register {id}");
        if self.masks.insert(id, parser).is_some() {
            log::warn!(target: "mask.registry", "{id} replaced an existing mask");
        }
        id
    }

    pub fn contains(&self, id: MaskId) -> bool {
        self.masks.contains_key(&id)
    }

    pub fn get(&self, id: MaskId) -> Option<&MaskParser<H>> {
        self.masks.get(&id)
    }

    pub fn get_mut(&mut self, id: MaskId) -> Option<&mut MaskParser<H>> {
        self.masks.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MaskId> + '_ {
        self.masks.keys().copied()
    }

    /// Returns `false` if `id` is unknown; the host is dropped in that case.
    pub fn attach_host(&mut self, id: MaskId, host: H) -> bool {
        match self.masks.get_mut(&id) {
            Some(mask) => {
                mask.attach_host(host);
                true
            }
            None => {
                log::debug!(target: "mask.registry", "attach_host: unknown {id}");
                false
            }
        }
    }

    /// Route a key event. Unknown ids pass the key through untouched.
    pub fn on_key_down(&mut self, id: MaskId, event: &KeyEvent) -> KeyOutcome {
        self.masks
            .get_mut(&id)
            .map_or(KeyOutcome::PassThrough, |mask| mask.on_key_down(event))
    }

    pub fn load_value(&mut self, id: MaskId, raw: &str) {
        if let Some(mask) = self.masks.get_mut(&id) {
            mask.load_value(raw);
        }
    }

    pub fn focus(&mut self, id: MaskId) {
        if let Some(mask) = self.masks.get_mut(&id) {
            mask.on_focus();
        }
    }

    pub fn blur(&mut self, id: MaskId) {
        if let Some(mask) = self.masks.get_mut(&id) {
            mask.on_blur();
        }
    }

    /// Remove a mask, handing back its host if one was attached.
    pub fn dispose(&mut self, id: MaskId) -> Option<H> {
        let mask = self.masks.remove(&id)?;
        log::debug!(target: "mask.registry", "dispose {id}");
        mask.dispose()
    }

    /// Tear down every mask.
    pub fn clear(&mut self) {
        log::debug!(target: "mask.registry", "clearing {} masks", self.masks.len());
        self.masks.clear();
    }
}
