//! The runtime scope stack: the search path for identifiers bytecode
//! could not resolve statically.
//!
//! A stack owns its frames and may reference a parent stack; lookups walk
//! from the most recently pushed frame down, then continue in the parent.
//! Stacks are single-thread owned; cloning shares the parent and copies
//! only this stack's frames.

use std::rc::Rc;

use ashlar_name::QName;

use crate::bind::{BindOptions, BindResult, BindStatus};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::value::Object;

/// One lookup frame: an object and the categories to search in it.
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    object: Object,
    options: BindOptions,
}

impl ScopeFrame {
    /// The frame's object.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// The frame's search options.
    pub fn options(&self) -> BindOptions {
        self.options
    }
}

/// The result of a scope walk: the matching frame (when one matched, or
/// the bottom-most frame in lenient mode) and the resolution status.
#[derive(Debug)]
pub struct ScopeFind<'a> {
    /// The frame the lookup settled on.
    pub frame: Option<&'a ScopeFrame>,
    /// `Success` or `Ambiguous` on a match; `Success` for the lenient
    /// fallback; `NotFound` in strict mode.
    pub status: BindStatus,
}

/// The runtime scope stack.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
    parent: Option<Rc<ScopeStack>>,
}

impl ScopeStack {
    /// An empty stack with no parent.
    pub fn new() -> Self {
        ScopeStack::default()
    }

    /// An empty stack that continues lookups in `parent`.
    pub fn with_parent(parent: Rc<ScopeStack>) -> Self {
        ScopeStack {
            frames: Vec::new(),
            parent: Some(parent),
        }
    }

    /// Push a frame with the default trait search.
    pub fn push(&mut self, object: Object) {
        self.push_with(object, BindOptions::SEARCH_TRAITS);
    }

    /// Push a frame with explicit search options.
    pub fn push_with(&mut self, object: Object, options: BindOptions) {
        self.frames.push(ScopeFrame { object, options });
    }

    /// Pop the top frame.
    pub fn pop(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    /// Drop frames down to the target size. Never touches the parent.
    pub fn truncate(&mut self, target_len: usize) {
        self.frames.truncate(target_len);
    }

    /// Drop every frame of this stack. Never touches the parent.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// The number of frames in this stack (the parent not included).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether this stack has no frames of its own.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The parent stack, if any.
    pub fn parent(&self) -> Option<&Rc<ScopeStack>> {
        self.parent.as_ref()
    }

    /// Walk the stack top to bottom, then the parent chain, for the first
    /// frame whose object resolves `name`.
    ///
    /// `start_level` skips that many frames from the top of this stack and
    /// resets to zero when the walk crosses into the parent. Without a
    /// match, lenient mode settles on the bottom-most frame with
    /// `Success`; strict mode reports `NotFound`.
    pub fn find(
        &self,
        runtime: &Runtime,
        name: &QName,
        start_level: usize,
        is_attribute: bool,
        strict: bool,
    ) -> Result<ScopeFind<'_>> {
        let mut stack = self;
        let mut skip = start_level;
        let mut bottom = None;
        loop {
            for frame in stack.frames.iter().rev().skip(skip) {
                let status =
                    runtime.probe(frame.object.as_any(), name, frame.options, is_attribute)?;
                if status == BindStatus::Success || status == BindStatus::Ambiguous {
                    return Ok(ScopeFind {
                        frame: Some(frame),
                        status,
                    });
                }
            }
            if let Some(first) = stack.frames.first() {
                bottom = Some(first);
            }
            match &stack.parent {
                Some(parent) => {
                    stack = parent;
                    skip = 0;
                }
                None => break,
            }
        }
        if strict {
            Ok(ScopeFind {
                frame: None,
                status: BindStatus::NotFound,
            })
        } else {
            Ok(ScopeFind {
                frame: bottom,
                status: if bottom.is_some() {
                    BindStatus::Success
                } else {
                    BindStatus::NotFound
                },
            })
        }
    }

    /// [`ScopeStack::find`], then read the property (or attribute) off the
    /// frame the walk settled on.
    pub fn get(
        &self,
        runtime: &Runtime,
        name: &QName,
        start_level: usize,
        is_attribute: bool,
        strict: bool,
    ) -> Result<BindResult> {
        let found = self.find(runtime, name, start_level, is_attribute, strict)?;
        match found.frame {
            Some(frame) => {
                if is_attribute || frame.options.attributes {
                    runtime.get_attribute(frame.object.as_any(), name)
                } else {
                    runtime.get_property(frame.object.as_any(), name)
                }
            }
            None => Ok(BindResult::status(found.status)),
        }
    }
}
