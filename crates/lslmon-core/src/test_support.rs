// Scripted in-memory directory shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::directory::{StreamDirectory, StreamHandle};
use crate::error::CoreError;
use crate::model::ResolvedStream;

#[derive(Default)]
struct Script {
    streams: Vec<ResolvedStream>,
    resolve_error: bool,
    resolve_panic: bool,
    failing: HashSet<String>,
    xml: HashMap<String, String>,
    connects: Vec<String>,
    closed: Vec<String>,
    resolves: usize,
}

/// Directory whose result set the test controls. Clones share state, so
/// a test keeps one clone after moving the other into a monitor.
#[derive(Clone, Default)]
pub(crate) struct ScriptedDirectory {
    script: Arc<Mutex<Script>>,
}

#[allow(clippy::unwrap_used)]
impl ScriptedDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_streams(names: &[&str]) -> Self {
        let dir = Self::new();
        dir.set(names);
        dir
    }

    /// Replace the advertised streams with minimal records.
    pub(crate) fn set(&self, names: &[&str]) {
        self.set_streams(names.iter().map(|n| stream(n)).collect());
    }

    pub(crate) fn set_streams(&self, streams: Vec<ResolvedStream>) {
        self.script.lock().unwrap().streams = streams;
    }

    pub(crate) fn fail_resolve(&self, fail: bool) {
        self.script.lock().unwrap().resolve_error = fail;
    }

    pub(crate) fn panic_on_resolve(&self, panic: bool) {
        self.script.lock().unwrap().resolve_panic = panic;
    }

    pub(crate) fn fail_connect(&self, name: &str) {
        self.script.lock().unwrap().failing.insert(name.to_owned());
    }

    pub(crate) fn set_xml(&self, name: &str, xml: &str) {
        self.script
            .lock()
            .unwrap()
            .xml
            .insert(name.to_owned(), xml.to_owned());
    }

    pub(crate) fn connects(&self) -> Vec<String> {
        self.script.lock().unwrap().connects.clone()
    }

    pub(crate) fn closed(&self) -> Vec<String> {
        self.script.lock().unwrap().closed.clone()
    }

    pub(crate) fn resolves(&self) -> usize {
        self.script.lock().unwrap().resolves
    }
}

#[allow(clippy::unwrap_used)]
impl StreamDirectory for ScriptedDirectory {
    type Handle = ScriptedHandle;

    async fn resolve(&self, _wait: Duration) -> Result<Vec<ResolvedStream>, CoreError> {
        let mut script = self.script.lock().unwrap();
        script.resolves += 1;
        if script.resolve_panic {
            // Release the lock first so the script stays usable.
            drop(script);
            panic!("scripted resolver crash");
        }
        if script.resolve_error {
            return Err(CoreError::DirectoryUnavailable {
                message: "scripted outage".into(),
            });
        }
        Ok(script.streams.clone())
    }

    async fn connect(&self, stream: &ResolvedStream) -> Result<ScriptedHandle, CoreError> {
        let mut script = self.script.lock().unwrap();
        script.connects.push(stream.name.clone());
        if script.failing.contains(&stream.name) {
            return Err(CoreError::connection(&stream.name, "scripted refusal"));
        }
        let xml = script
            .xml
            .get(&stream.name)
            .cloned()
            .unwrap_or_else(|| info_xml(&stream.name));
        Ok(ScriptedHandle {
            name: stream.name.clone(),
            xml,
            script: Arc::clone(&self.script),
        })
    }
}

pub(crate) struct ScriptedHandle {
    name: String,
    xml: String,
    script: Arc<Mutex<Script>>,
}

#[allow(clippy::unwrap_used)]
impl StreamHandle for ScriptedHandle {
    fn info_xml(&self) -> &str {
        &self.xml
    }

    fn close(self) {
        self.script.lock().unwrap().closed.push(self.name);
    }
}

pub(crate) fn stream(name: &str) -> ResolvedStream {
    ResolvedStream {
        uid: format!("uid-{name}"),
        name: name.to_owned(),
        stream_type: "EEG".into(),
        channel_count: 8,
        nominal_srate: 250.0,
        source_id: format!("src-{name}"),
        hostname: "lab-pc".into(),
    }
}

pub(crate) fn info_xml(name: &str) -> String {
    format!(
        "<info><name>{name}</name><type>EEG</type><channel_count>8</channel_count>\
         <nominal_srate>250</nominal_srate><uid>uid-{name}</uid></info>"
    )
}
