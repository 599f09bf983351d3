//! The card viewer: ties catalog, state, animation and composition together.

use crate::{
    animation::AnimationParams,
    cache::ResourceCache,
    catalog::{Catalog, Item},
    compose::{compose, Frame},
    error::ViewerError,
    interaction::{self, HostEvent, Transition},
    state::{Selection, ViewerState},
    visual::{VisualAttrs, VisualMemo},
};
use crossbeam_channel::{Receiver, Sender};
use std::time::Duration;

pub struct CardViewer {
    catalog: Catalog,
    params: AnimationParams,
    state: ViewerState,
    memo: VisualMemo,
    subscribers: Vec<Sender<Selection>>,
}

impl CardViewer {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_params(catalog, AnimationParams::default())
    }

    pub fn with_params(catalog: Catalog, params: AnimationParams) -> Self {
        log::debug!("Card viewer over {} item(s)", catalog.len());
        Self {
            catalog,
            params,
            state: ViewerState::default(),
            memo: VisualMemo::new(),
            subscribers: Vec::new(),
        }
    }

    /// Fails with [`ViewerError::InvalidCatalog`] when `items` is empty.
    pub fn from_items(items: Vec<Item>) -> Result<Self, ViewerError> {
        Ok(Self::new(Catalog::new(items)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn active_item(&self) -> &Item {
        &self.catalog.items()[self.state.active_index()]
    }

    /// Receives the new [`Selection`] after every index or hover change.
    pub fn subscribe(&mut self) -> Receiver<Selection> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Requests every texture the catalog references.
    pub fn preload(&self, cache: &ResourceCache) {
        cache.preload(&self.catalog.resource_ids());
    }

    pub fn handle(&mut self, event: HostEvent) -> Transition {
        let t = interaction::apply(&mut self.state, self.catalog.len(), event);
        if t.index_changed {
            log::debug!(
                "Active item -> {} '{}'",
                self.state.active_index(),
                self.active_item().name
            );
        }
        self.publish(t);
        t
    }

    pub fn set_active_index(&mut self, index: usize) -> Result<(), ViewerError> {
        let t = interaction::set_active_index(&mut self.state, self.catalog.len(), index)?;
        self.publish(t);
        Ok(())
    }

    /// Advances the animation to `elapsed` since start. Call once per frame.
    pub fn tick(&mut self, elapsed: Duration) {
        self.params.step(&mut self.state, elapsed);
    }

    pub fn visual(&mut self) -> &VisualAttrs {
        let index = self.state.active_index();
        let item = &self.catalog.items()[index];
        self.memo.get(index, item, self.state.hovered())
    }

    /// Composes the current frame from state and the memoized visual record.
    pub fn frame(&mut self) -> Frame {
        let index = self.state.active_index();
        let item = &self.catalog.items()[index];
        let visual = self.memo.get(index, item, self.state.hovered());
        compose(item, visual, &self.state)
    }

    pub fn visual_recomputes(&self) -> u64 {
        self.memo.recomputes()
    }

    fn publish(&mut self, t: Transition) {
        if !t.selection_changed() {
            return;
        }
        let selection = self.state.selection();
        self.subscribers.retain(|tx| tx.send(selection).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::{LoadMode, ResourceLoader, TextureData},
        catalog::{Level, ResourceId},
        compose::{LabelRole, QuadRole},
        error::LoadError,
        interaction::Viewport,
    };
    use std::sync::Arc;

    fn catalog(n: usize) -> Catalog {
        let items = (0..n)
            .map(|i| {
                Item::new(
                    format!("skill-{i}"),
                    Level::new((i as u32 * 10) % 101).unwrap(),
                    "#3776AB".parse().unwrap(),
                    format!("/art-{i}.webp").as_str(),
                    "/raw_texture.webp",
                )
            })
            .collect();
        Catalog::new(items).unwrap()
    }

    #[test]
    fn empty_items_fail_construction() {
        assert!(matches!(
            CardViewer::from_items(vec![]),
            Err(ViewerError::InvalidCatalog)
        ));
    }

    #[test]
    fn click_advances_displayed_item() {
        let mut v = CardViewer::new(catalog(3));
        v.handle(HostEvent::Click);
        let frame = v.frame();
        assert_eq!(frame.label(LabelRole::Name).unwrap().text, "skill-1");
        assert_eq!(
            frame.quad(QuadRole::Art).unwrap().texture,
            Some(ResourceId::new("/art-1.webp"))
        );
    }

    #[test]
    fn subscribers_see_index_and_hover_changes() {
        let mut v = CardViewer::new(catalog(2));
        let rx = v.subscribe();

        v.handle(HostEvent::PointerEnter);
        v.handle(HostEvent::PointerEnter);
        v.handle(HostEvent::PointerMove {
            x: 1.0,
            y: 1.0,
            viewport: Viewport::new(10.0, 10.0),
        });
        v.handle(HostEvent::Click);
        v.handle(HostEvent::PointerLeave);

        let seen: Vec<Selection> = rx.try_iter().collect();
        assert_eq!(
            seen,
            vec![
                Selection { active_index: 0, hovered: true },
                Selection { active_index: 1, hovered: true },
                Selection { active_index: 1, hovered: false },
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut v = CardViewer::new(catalog(2));
        drop(v.subscribe());
        let live = v.subscribe();
        v.handle(HostEvent::Click);
        assert_eq!(v.subscribers.len(), 1);
        assert_eq!(live.try_recv().unwrap().active_index, 1);
    }

    #[test]
    fn set_active_index_rejects_out_of_range() {
        let mut v = CardViewer::new(catalog(2));
        assert!(v.set_active_index(5).is_err());
        assert_eq!(v.selection().active_index, 0);
        v.set_active_index(1).unwrap();
        assert_eq!(v.active_item().name, "skill-1");
    }

    #[test]
    fn frames_reuse_visual_until_inputs_change() {
        let mut v = CardViewer::new(catalog(3));
        for i in 0..120 {
            v.tick(Duration::from_millis(i * 16));
            v.frame();
        }
        assert_eq!(v.visual_recomputes(), 1);

        v.handle(HostEvent::PointerEnter);
        v.frame();
        v.frame();
        v.handle(HostEvent::Click);
        v.frame();
        assert_eq!(v.visual_recomputes(), 3);
    }

    #[test]
    fn tick_runs_without_events() {
        let mut v = CardViewer::new(catalog(1));
        v.tick(Duration::from_secs(2));
        let a = v.state().orientation();
        v.tick(Duration::from_secs(3));
        let b = v.state().orientation();
        assert_ne!(a, b);
        assert_eq!(v.state().depth_offset(), 0.0);
    }

    #[test]
    fn preload_requests_every_catalog_resource() {
        struct Solid;
        impl ResourceLoader for Solid {
            fn load(&self, _: &ResourceId) -> Result<TextureData, LoadError> {
                TextureData::new(1, 1, vec![255; 4])
            }
        }
        let v = CardViewer::new(catalog(3));
        let cache = ResourceCache::new(Arc::new(Solid), LoadMode::Inline);
        v.preload(&cache);
        for id in v.catalog().resource_ids() {
            assert_eq!(cache.status(&id), crate::cache::SlotStatus::Ready);
        }
    }
}
