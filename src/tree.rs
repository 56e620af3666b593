//! Per-method routing trie.
//!
//! One tree per HTTP method, each an arena of [`Node`]s addressed by index.
//! A node has any number of static children and at most one *dynamic*
//! child: a wildcard, a plain parameter, or a regex-constrained parameter.
//! Keeping the dynamic child in a single slot is what makes "a wildcard and
//! a parameter at the same position" impossible to build.
//!
//! Lookup walks one segment at a time and never backtracks. At each node:
//!
//! 1. exact static child
//! 2. regex parameter, if the segment matches its pattern
//! 3. plain parameter
//! 4. wildcard, which ends the walk and swallows the rest of the path

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use regex::Regex;

use crate::error::{RouteError, RouteErrorKind};
use crate::handler::Next;
use crate::middleware::{self, Middleware};
use crate::path::{self, Segment};

type NodeId = usize;

const ROOT: NodeId = 0;

// ── Node ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Dynamic {
    Wildcard(NodeId),
    Param { name: String, child: NodeId },
    Regex { name: String, source: String, pattern: Regex, child: NodeId },
}

impl Dynamic {
    /// The existing child when `segment` describes exactly this one.
    fn reuse(&self, segment: &Segment<'_>) -> Option<NodeId> {
        match (self, segment) {
            (Self::Wildcard(child), Segment::Wildcard) => Some(*child),
            (Self::Param { name, child }, Segment::Param(n)) if name == n => Some(*child),
            (Self::Regex { name, source, child, .. }, Segment::Regex { name: n, source: s, .. })
                if name == n && source == s =>
            {
                Some(*child)
            }
            _ => None,
        }
    }

    fn child(&self) -> NodeId {
        match self {
            Self::Wildcard(child)
            | Self::Param { child, .. }
            | Self::Regex { child, .. } => *child,
        }
    }
}

/// One position in a method's tree.
pub(crate) struct Node {
    label: String,
    statics: HashMap<String, NodeId>,
    dynamic: Option<Dynamic>,
    handler: Option<Next>,
    middlewares: Vec<Middleware>,
    route: Option<Arc<str>>,
}

impl Node {
    fn new(label: String) -> Self {
        Self {
            label,
            statics: HashMap::new(),
            dynamic: None,
            handler: None,
            middlewares: Vec::new(),
            route: None,
        }
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────────

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new() -> Self {
        Self { nodes: vec![Node::new("/".to_owned())] }
    }

    fn push(&mut self, label: String) -> NodeId {
        self.nodes.push(Node::new(label));
        self.nodes.len() - 1
    }

    /// Walks `path`, creating missing nodes, and returns the terminal node.
    fn insert(&mut self, path: &str) -> Result<NodeId, RouteError> {
        let mut id = ROOT;
        for segment in path::parse(path)? {
            id = self.child_or_create(id, segment, path)?;
        }
        let node = &mut self.nodes[id];
        if node.route.is_none() {
            node.route = Some(Arc::from(path));
        }
        Ok(id)
    }

    fn child_or_create(
        &mut self,
        parent: NodeId,
        segment: Segment<'_>,
        path: &str,
    ) -> Result<NodeId, RouteError> {
        if let Segment::Static(label) = segment {
            if let Some(&child) = self.nodes[parent].statics.get(label) {
                return Ok(child);
            }
            let child = self.push(label.to_owned());
            self.nodes[parent].statics.insert(label.to_owned(), child);
            return Ok(child);
        }

        if let Some(existing) = &self.nodes[parent].dynamic {
            return existing.reuse(&segment).ok_or_else(|| {
                RouteError::new(
                    RouteErrorKind::Conflict,
                    path,
                    format!(
                        "`{}` conflicts with `{}` already registered at this position",
                        token(&segment),
                        self.nodes[existing.child()].label,
                    ),
                )
            });
        }

        let child = self.push(token(&segment));
        self.nodes[parent].dynamic = Some(match segment {
            Segment::Wildcard => Dynamic::Wildcard(child),
            Segment::Param(name) => Dynamic::Param { name: name.to_owned(), child },
            Segment::Regex { name, source, pattern } => Dynamic::Regex {
                name: name.to_owned(),
                source: source.to_owned(),
                pattern,
                child,
            },
            Segment::Static(_) => unreachable!("static segments return above"),
        });
        Ok(child)
    }

    fn find(&self, path: &str) -> Option<(NodeId, HashMap<String, String>)> {
        let mut id = ROOT;
        let mut params = HashMap::new();

        for segment in path::request_segments(path) {
            let node = &self.nodes[id];
            if let Some(&child) = node.statics.get(segment.as_ref()) {
                id = child;
                continue;
            }
            id = match node.dynamic.as_ref()? {
                Dynamic::Regex { name, pattern, child, .. } if pattern.is_match(&segment) => {
                    params.insert(name.clone(), segment.into_owned());
                    *child
                }
                Dynamic::Regex { .. } => return None,
                Dynamic::Param { name, child } => {
                    params.insert(name.clone(), segment.into_owned());
                    *child
                }
                Dynamic::Wildcard(child) => return Some((*child, params)),
            };
        }

        Some((id, params))
    }
}

/// The token a segment was written as, used as the node label.
fn token(segment: &Segment<'_>) -> String {
    match segment {
        Segment::Static(label) => (*label).to_owned(),
        Segment::Wildcard => "*".to_owned(),
        Segment::Param(name) => format!(":{name}"),
        Segment::Regex { name, source, .. } => format!(":{name}({source})"),
    }
}

// ── RouteTrie ─────────────────────────────────────────────────────────────────

/// All routes: one tree per method. Methods are independent namespaces.
#[derive(Default)]
pub(crate) struct RouteTrie {
    trees: HashMap<Method, Tree>,
}

impl RouteTrie {
    /// Binds `handler` to `method` + `path`.
    pub(crate) fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: Next,
    ) -> Result<(), RouteError> {
        let tree = self.trees.entry(method).or_insert_with(Tree::new);
        let id = tree.insert(path)?;
        let node = &mut tree.nodes[id];
        if node.handler.is_some() {
            return Err(RouteError::new(
                RouteErrorKind::Duplicate,
                path,
                "a handler is already registered for this path",
            ));
        }
        node.handler = Some(handler);
        Ok(())
    }

    /// Appends route-scoped middleware to `method` + `path`, creating the
    /// node if needed. The handler, if any, is left alone.
    pub(crate) fn add_middlewares(
        &mut self,
        method: Method,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Result<(), RouteError> {
        let tree = self.trees.entry(method).or_insert_with(Tree::new);
        let id = tree.insert(path)?;
        tree.nodes[id].middlewares.extend(middlewares);
        Ok(())
    }

    /// Wraps every handler in its route-scoped middleware. Runs once, when
    /// the router is frozen.
    pub(crate) fn seal(&mut self) {
        for node in self.trees.values_mut().flat_map(|tree| tree.nodes.iter_mut()) {
            if let Some(handler) = node.handler.take() {
                node.handler = Some(middleware::build(handler, &node.middlewares));
            }
        }
    }

    pub(crate) fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let tree = self.trees.get(method)?;
        let (id, params) = tree.find(path)?;
        Some(RouteMatch { node: &tree.nodes[id], params })
    }

    /// Every `(method, route)` with a handler, sorted.
    pub(crate) fn routes(&self) -> Vec<(&Method, &str)> {
        let mut routes: Vec<_> = self
            .trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.nodes
                    .iter()
                    .filter(|n| n.handler.is_some())
                    .filter_map(move |n| Some((method, n.route.as_deref()?)))
            })
            .collect();
        routes.sort_by(|a, b| (a.1, a.0.as_str()).cmp(&(b.1, b.0.as_str())));
        routes
    }
}

// ── RouteMatch ────────────────────────────────────────────────────────────────

/// The result of a successful lookup.
///
/// The node reached may be a bare prefix with no handler for this method,
/// e.g. `/users` when only `/users/:id` is registered. The dispatcher
/// answers those with `404`, same as no match at all.
pub struct RouteMatch<'t> {
    node: &'t Node,
    params: HashMap<String, String>,
}

impl<'t> RouteMatch<'t> {
    /// Whether a handler is bound to the node reached.
    pub fn has_handler(&self) -> bool {
        self.node.handler.is_some()
    }

    /// The registration path of the node reached, if one was registered
    /// there (by a handler or by route-scoped middleware).
    pub fn route(&self) -> Option<&'t str> {
        self.node.route.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub(crate) fn handler(&self) -> Option<&'t Next> {
        self.node.handler.as_ref()
    }

    pub(crate) fn route_arc(&self) -> Option<Arc<str>> {
        self.node.route.clone()
    }

    pub(crate) fn into_params(self) -> HashMap<String, String> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::handler::Handler;

    async fn noop(ctx: Context) -> Context { ctx }

    fn trie(routes: &[&str]) -> RouteTrie {
        let mut trie = RouteTrie::default();
        for path in routes {
            trie.add_route(Method::GET, path, noop.into_next()).unwrap();
        }
        trie
    }

    fn matched(trie: &RouteTrie, path: &str) -> Option<String> {
        trie.find_route(&Method::GET, path)
            .filter(|m| m.has_handler())
            .and_then(|m| m.route().map(str::to_owned))
    }

    #[test]
    fn registered_paths_round_trip() {
        let cases = [
            ("/", "/"),
            ("/user", "/user"),
            ("/user/home", "/user/home"),
            ("/order/:id", "/order/17"),
            (r"/reg/:id(\d+)", "/reg/42"),
            ("/static/*", "/static/css/site.css"),
        ];
        let trie = trie(&cases.map(|(route, _)| route));
        for (route, request) in cases {
            let m = trie.find_route(&Method::GET, request).unwrap();
            assert!(m.has_handler(), "{request}");
            assert_eq!(m.route(), Some(route));
        }
    }

    #[test]
    fn static_beats_wildcard() {
        let trie = trie(&["/order/detail", "/order/*"]);
        assert_eq!(matched(&trie, "/order/detail").as_deref(), Some("/order/detail"));
        assert_eq!(matched(&trie, "/order/other").as_deref(), Some("/order/*"));
    }

    #[test]
    fn static_beats_param() {
        let trie = trie(&["/user/home", "/user/:id"]);
        assert_eq!(matched(&trie, "/user/home").as_deref(), Some("/user/home"));
        let m = trie.find_route(&Method::GET, "/user/42").unwrap();
        assert_eq!(m.route(), Some("/user/:id"));
        assert_eq!(m.param("id"), Some("42"));
    }

    #[test]
    fn wildcard_swallows_remaining_segments() {
        let trie = trie(&["/a/b/*"]);
        assert_eq!(matched(&trie, "/a/b/c").as_deref(), Some("/a/b/*"));
        assert_eq!(matched(&trie, "/a/b/c/d/e").as_deref(), Some("/a/b/*"));
    }

    #[test]
    fn root_wildcard_matches_everything_below_root() {
        let trie = trie(&["/*"]);
        assert_eq!(matched(&trie, "/anything/at/all").as_deref(), Some("/*"));
        assert_eq!(matched(&trie, "/"), None);
    }

    #[test]
    fn captures_params_at_every_depth() {
        let trie = trie(&["/user/:id/post/:post"]);
        let m = trie.find_route(&Method::GET, "/user/7/post/hello").unwrap();
        assert_eq!(m.params().len(), 2);
        assert_eq!(m.param("id"), Some("7"));
        assert_eq!(m.param("post"), Some("hello"));
    }

    #[test]
    fn regex_constrains_the_segment() {
        let trie = trie(&[r"/user/:id(\d+)"]);
        let m = trie.find_route(&Method::GET, "/user/123").unwrap();
        assert_eq!(m.param("id"), Some("123"));
        assert!(trie.find_route(&Method::GET, "/user/abc").is_none());
    }

    #[test]
    fn intermediate_node_has_no_handler() {
        let trie = trie(&["/user/home"]);
        let m = trie.find_route(&Method::GET, "/user").unwrap();
        assert!(!m.has_handler());
        assert_eq!(m.route(), None);
    }

    #[test]
    fn misses() {
        let trie = trie(&["/user/home"]);
        assert!(trie.find_route(&Method::GET, "/user/home/deeper").is_none());
        assert!(trie.find_route(&Method::GET, "/nope").is_none());
        assert!(trie.find_route(&Method::POST, "/user/home").is_none());
    }

    #[test]
    fn lookup_does_not_backtrack() {
        // `/a/b` leads into the static `b` node, which has no `c` child; the
        // wildcard one level up is not retried.
        let trie = trie(&["/a/b/x", "/a/*"]);
        assert!(trie.find_route(&Method::GET, "/a/b/c").is_none());
    }

    #[test]
    fn trailing_slash_on_request_is_ignored() {
        let trie = trie(&["/user/:id"]);
        assert_eq!(trie.find_route(&Method::GET, "/user/9/").unwrap().param("id"), Some("9"));
    }

    #[test]
    fn methods_are_independent() {
        let mut trie = trie(&["/x"]);
        trie.add_route(Method::POST, "/x", noop.into_next()).unwrap();
        let ext = Method::from_bytes(b"PURGE").unwrap();
        trie.add_route(ext.clone(), "/x", noop.into_next()).unwrap();
        assert!(trie.find_route(&ext, "/x").unwrap().has_handler());
    }

    #[test]
    fn shared_prefixes_are_reused() {
        let trie = trie(&["/user/:id", "/user/:id/profile", r"/file/:n(\d+)", r"/file/:n(\d+)/raw", "/s/*"]);
        assert_eq!(matched(&trie, "/user/1/profile").as_deref(), Some("/user/:id/profile"));
        assert_eq!(matched(&trie, "/file/3/raw").as_deref(), Some(r"/file/:n(\d+)/raw"));
    }

    #[test]
    fn wildcard_and_param_conflict_both_ways() {
        let mut trie = trie(&["/a/*", "/b/:id"]);
        let err = trie.add_route(Method::GET, "/a/:id", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
        let err = trie.add_route(Method::GET, "/b/*", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
        let err = trie.add_route(Method::GET, r"/b/:id(\d+)", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
        let err = trie.add_route(Method::GET, r"/a/:id(\d+)", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
    }

    #[test]
    fn differing_params_conflict() {
        let mut trie = trie(&["/a/:id", r"/b/:id(\d+)"]);
        let err = trie.add_route(Method::GET, "/a/:name", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
        let err = trie.add_route(Method::GET, r"/b/:id(\w+)", noop.into_next()).unwrap_err();
        assert_eq!(err.kind(), RouteErrorKind::Conflict);
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut trie = trie(&["/", "/x", "/y/*"]);
        for path in ["/", "/x", "/y/*"] {
            let err = trie.add_route(Method::GET, path, noop.into_next()).unwrap_err();
            assert_eq!(err.kind(), RouteErrorKind::Duplicate, "{path}");
        }
    }

    #[test]
    fn middleware_registration_leaves_handler_alone() {
        let mut trie = RouteTrie::default();
        trie.add_middlewares(Method::GET, "/x", Vec::new()).unwrap();
        assert!(!trie.find_route(&Method::GET, "/x").unwrap().has_handler());
        trie.add_route(Method::GET, "/x", noop.into_next()).unwrap();
        assert!(trie.find_route(&Method::GET, "/x").unwrap().has_handler());
    }

    #[test]
    fn routes_lists_only_handlers() {
        let trie = trie(&["/b", "/a/c"]);
        let routes: Vec<_> = trie.routes().into_iter().map(|(_, r)| r).collect();
        assert_eq!(routes, ["/a/c", "/b"]);
    }
}
