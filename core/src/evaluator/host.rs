//! The host side of evaluation.
//!
//! A formula only knows names. Everything a name stands for (instance
//! attributes, host functions, randomness) comes from a [`TermEvaluator`].

use super::{EvalError, ListEvaluationAid};
use crate::values::Value;
use ecow::EcoString;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// True when `value` is the "not found" answer for `name`: the name echoed
/// back as a string.
///
/// A host constant whose value is a string equal to its own name is
/// indistinguishable from an unresolved one.
pub fn is_unresolved(value: &Value, name: &str) -> bool {
    matches!(value, Value::Str(s) if s == name)
}

/// Resolves names, dispatches host functions and provides randomness.
///
/// Batch evaluation runs over `0..size()` instances; the interpreter calls
/// [`TermEvaluator::set_index`] before evaluating anything for an instance.
pub trait TermEvaluator {
    /// Value of a bare name. Unknown names are echoed back as strings.
    fn resolve_constant(&mut self, name: &str) -> Result<Value, EvalError> {
        Ok(Value::Str(name.into()))
    }

    /// Value of a bare name for every active instance, in enumeration order.
    fn resolve_constants_for_list(
        &mut self,
        name: &str,
        aid: &ListEvaluationAid,
    ) -> Result<Vec<Value>, EvalError> {
        sweep_constants(self, name, aid)
    }

    /// Calls a function the built-in library does not know.
    /// `None` means the host does not know it either.
    fn call_function(&mut self, _name: &str, _args: &[Value]) -> Option<Result<Value, EvalError>> {
        None
    }

    /// Batch form of [`TermEvaluator::call_function`]. `args` holds one
    /// column of values per argument, each aligned with the active indices.
    fn call_function_for_list(
        &mut self,
        name: &str,
        args: &[Vec<Value>],
        aid: &ListEvaluationAid,
    ) -> Option<Result<Vec<Value>, EvalError>> {
        sweep_calls(self, name, args, aid)
    }

    /// Whether the host defines `name`.
    fn exists(&self, _name: &str) -> bool {
        false
    }

    fn rng(&mut self) -> &mut dyn RngCore;

    /// Number of instances in batch evaluation.
    fn size(&self) -> usize {
        1
    }

    fn set_index(&mut self, _index: usize) {}
}

/// Resolves `name` once per active instance through `set_index`.
fn sweep_constants<H: TermEvaluator + ?Sized>(
    host: &mut H,
    name: &str,
    aid: &ListEvaluationAid,
) -> Result<Vec<Value>, EvalError> {
    let size = host.size();
    let mut values = Vec::with_capacity(aid.active_count(size));
    let mut cursor = aid.cursor(size);
    while cursor.set_next_index(host) {
        values.push(host.resolve_constant(name)?);
    }
    Ok(values)
}

/// Calls `name` once per active instance, with that instance's row of `args`.
fn sweep_calls<H: TermEvaluator + ?Sized>(
    host: &mut H,
    name: &str,
    args: &[Vec<Value>],
    aid: &ListEvaluationAid,
) -> Option<Result<Vec<Value>, EvalError>> {
    let size = host.size();
    let mut values = Vec::with_capacity(aid.active_count(size));
    let mut cursor = aid.cursor(size);
    let mut row = 0;
    while cursor.set_next_index(host) {
        let call_args: Vec<Value> = args.iter().map(|column| column[row].clone()).collect();
        match host.call_function(name, &call_args)? {
            Ok(value) => values.push(value),
            Err(e) => return Some(Err(e)),
        }
        row += 1;
    }
    Some(Ok(values))
}

/// Consults `primary` first and falls back to `secondary`.
///
/// A name `primary` leaves unresolved is asked of `secondary`; the first
/// host that handles a function call wins. Index changes reach both.
///
/// `primary` owns the instance count. The batch overrides of both hosts are
/// used only while their sizes agree; otherwise batch requests are answered
/// one instance at a time through this host.
#[derive(Debug)]
pub struct CombinedEvaluator<A, B> {
    pub primary: A,
    pub secondary: B,
}

impl<A: TermEvaluator, B: TermEvaluator> CombinedEvaluator<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }

    fn sizes_agree(&self) -> bool {
        self.primary.size() == self.secondary.size()
    }
}

impl<A: TermEvaluator, B: TermEvaluator> TermEvaluator for CombinedEvaluator<A, B> {
    fn resolve_constant(&mut self, name: &str) -> Result<Value, EvalError> {
        let value = self.primary.resolve_constant(name)?;
        if is_unresolved(&value, name) {
            self.secondary.resolve_constant(name)
        } else {
            Ok(value)
        }
    }

    fn call_function(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
        match self.primary.call_function(name, args) {
            Some(result) => Some(result),
            None => self.secondary.call_function(name, args),
        }
    }

    fn resolve_constants_for_list(
        &mut self,
        name: &str,
        aid: &ListEvaluationAid,
    ) -> Result<Vec<Value>, EvalError> {
        if !self.sizes_agree() {
            return sweep_constants(self, name, aid);
        }
        let mut values = self.primary.resolve_constants_for_list(name, aid)?;
        if values.iter().any(|value| is_unresolved(value, name)) {
            let fallback = self.secondary.resolve_constants_for_list(name, aid)?;
            for (value, other) in values.iter_mut().zip(fallback) {
                if is_unresolved(value, name) {
                    *value = other;
                }
            }
        }
        Ok(values)
    }

    fn call_function_for_list(
        &mut self,
        name: &str,
        args: &[Vec<Value>],
        aid: &ListEvaluationAid,
    ) -> Option<Result<Vec<Value>, EvalError>> {
        if !self.sizes_agree() {
            return sweep_calls(self, name, args, aid);
        }
        match self.primary.call_function_for_list(name, args, aid) {
            Some(result) => Some(result),
            None => self.secondary.call_function_for_list(name, args, aid),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.primary.exists(name) || self.secondary.exists(name)
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        self.primary.rng()
    }

    fn size(&self) -> usize {
        self.primary.size()
    }

    fn set_index(&mut self, index: usize) {
        self.primary.set_index(index);
        self.secondary.set_index(index);
    }
}

/// A host backed by plain tables.
///
/// Names are looked up in the current instance's table first, then in the
/// global table.
#[derive(Debug, Clone)]
pub struct TableEvaluator {
    globals: HashMap<EcoString, Value>,
    instances: Vec<HashMap<EcoString, Value>>,
    index: usize,
    rng: StdRng,
}

impl Default for TableEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEvaluator {
    /// A single-instance host with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// A single-instance host with a reproducible random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// A host with `count` empty instance tables.
    pub fn with_instances(count: usize) -> Self {
        let mut host = Self::with_seed(0);
        host.instances = vec![HashMap::new(); count];
        host
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            globals: HashMap::new(),
            instances: Vec::new(),
            index: 0,
            rng,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn set_global(&mut self, name: impl Into<EcoString>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Sets `name` for one instance, growing the instance list as needed.
    pub fn set_instance_value(
        &mut self,
        index: usize,
        name: impl Into<EcoString>,
        value: impl Into<Value>,
    ) {
        if self.instances.len() <= index {
            self.instances.resize_with(index + 1, HashMap::new);
        }
        self.instances[index].insert(name.into(), value.into());
    }

    /// Current instance.
    pub fn index(&self) -> usize {
        self.index
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.instances
            .get(self.index)
            .and_then(|table| table.get(name))
            .or_else(|| self.globals.get(name))
    }
}

impl TermEvaluator for TableEvaluator {
    fn resolve_constant(&mut self, name: &str) -> Result<Value, EvalError> {
        Ok(self
            .lookup(name)
            .cloned()
            .unwrap_or_else(|| Value::Str(name.into())))
    }

    fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn size(&self) -> usize {
        self.instances.len().max(1)
    }

    fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}
