//! Receivers of streamed search results.

use std::ops::ControlFlow;

use crate::link::LinkId;

/// Receives the results of a search as they are found.
///
/// Every matching link is offered to [`check_link`](LinkFilter::check_link)
/// first. Link searches then push each accepted link, string searches push
/// each matching string that has at least one accepted link. A `Break` from a
/// push ends the search early; this is not an error, the search returns `Ok`.
pub trait LinkFilter {
    /// Whether `link` is part of the result. Accepts every link by default.
    fn check_link(&mut self, _link: LinkId) -> bool {
        true
    }

    fn push_link(&mut self, _link: LinkId) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn push_content(&mut self, _content: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Filter accepting everything and keeping what is pushed.
#[derive(Debug, Default)]
pub struct Collect {
    pub links: Vec<LinkId>,
    pub contents: Vec<Vec<u8>>,
}

impl LinkFilter for Collect {
    fn push_link(&mut self, link: LinkId) -> ControlFlow<()> {
        self.links.push(link);
        ControlFlow::Continue(())
    }

    fn push_content(&mut self, content: &[u8]) -> ControlFlow<()> {
        self.contents.push(content.to_vec());
        ControlFlow::Continue(())
    }
}

/// Filter keeping the links accepted by a predicate, up to a limit.
pub struct FirstLinks<P> {
    accept: P,
    limit: usize,
    links: Vec<LinkId>,
}

impl<P: FnMut(LinkId) -> bool> FirstLinks<P> {
    pub fn new(limit: usize, accept: P) -> FirstLinks<P> {
        FirstLinks {
            accept,
            limit,
            links: Vec::new(),
        }
    }

    pub fn into_links(self) -> Vec<LinkId> {
        self.links
    }
}

impl<P: FnMut(LinkId) -> bool> LinkFilter for FirstLinks<P> {
    fn check_link(&mut self, link: LinkId) -> bool {
        (self.accept)(link)
    }

    fn push_link(&mut self, link: LinkId) -> ControlFlow<()> {
        self.links.push(link);
        if self.links.len() >= self.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
