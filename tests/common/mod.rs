//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use spark_scene::host::{HostStats, MemoryHost, NodeId};
use spark_scene::types::{Frame, Size};
use spark_scene::{Config, Runtime};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Runtime over a fresh memory host with one root of `size`.
pub fn runtime(size: Size) -> (Runtime<MemoryHost>, NodeId) {
    runtime_with(size, Config::default())
}

pub fn runtime_with(size: Size, config: Config) -> (Runtime<MemoryHost>, NodeId) {
    init_tracing();
    let mut host = MemoryHost::new();
    let root = host.create_root(size);
    (Runtime::new(host, config), root)
}

pub fn stats(runtime: &Runtime<MemoryHost>) -> HostStats {
    runtime.with_host(|host| host.stats()).unwrap()
}

pub fn clear_log(runtime: &Runtime<MemoryHost>) {
    runtime.with_host_mut(|host| host.clear_log()).unwrap();
}

pub fn outline(runtime: &Runtime<MemoryHost>, root: NodeId) -> String {
    runtime.with_host(|host| host.outline(root)).unwrap()
}

pub fn children(runtime: &Runtime<MemoryHost>, node: NodeId) -> Vec<NodeId> {
    runtime.with_host(|host| host.children(node).to_vec()).unwrap()
}

pub fn find_text(runtime: &Runtime<MemoryHost>, root: NodeId, text: &str) -> Option<NodeId> {
    runtime.with_host(|host| host.find_text(root, text)).unwrap()
}

pub fn frame(runtime: &Runtime<MemoryHost>, node: NodeId) -> Frame {
    runtime.with_host(|host| host.frame(node)).unwrap().unwrap_or_default()
}

pub fn live_count(runtime: &Runtime<MemoryHost>) -> usize {
    runtime.with_host(|host| host.live_count()).unwrap()
}

/// Shared counter for render/effect bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}
