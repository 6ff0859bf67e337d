//! Typed action dispatch.
//!
//! An action is any `Fn` whose parameters are drawn from a small set of
//! injectable types: [`Args`], [`Context`], [`Config<C>`] and [`Global<G>`].
//! Each parameter type names the slot it is filled from, so the slots an
//! action needs are known when it is registered. Before the action runs,
//! those slots are checked against what the running context can offer; a
//! parameter nothing can fill is an error and the action is never called.
//!
//! ```ignore
//! app.action(|Args(args): Args, Config(opts): Config<ServeOpts>, ctx: Context| {
//!     ctx.info(format!("serving {} on {}", args.len(), opts.port));
//!     Ok::<(), String>(())
//! })
//! ```

use std::fmt::Display;
use std::ops::Deref;

use crate::context::Context;
use crate::error::ClapbindError;

/// Positional arguments after the program or command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(pub Vec<String>);

/// The current context's own record: the app record in a root action, the
/// command record in a command action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config<C>(pub C);

/// The app's root record, seen from a command action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Global<G>(pub G);

impl Deref for Args {
    type Target = Vec<String>;
    fn deref(&self) -> &Vec<String> {
        &self.0
    }
}

impl<C> Deref for Config<C> {
    type Target = C;
    fn deref(&self) -> &C {
        &self.0
    }
}

impl<G> Deref for Global<G> {
    type Target = G;
    fn deref(&self) -> &G {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Args,
    Context,
    Config,
    Global,
}

/// The slots a context offers, and how to describe them in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    slots: Vec<Slot>,
    accepted: String,
}

impl Offer {
    pub fn new<C, G>(config: bool, global: bool) -> Self {
        let mut slots = vec![Slot::Args, Slot::Context];
        let mut names = vec!["Args".to_string(), "Context".to_string()];
        if config {
            slots.push(Slot::Config);
            names.push(format!("Config<{}>", short_type_name::<C>()));
        }
        if global {
            slots.push(Slot::Global);
            names.push(format!("Global<{}>", short_type_name::<G>()));
        }
        Self {
            slots,
            accepted: join_or(&names),
        }
    }

    /// Fail on the first declared slot this offer cannot fill.
    pub fn check(&self, declared: &[Slot]) -> Result<(), ClapbindError> {
        match declared.iter().position(|slot| !self.slots.contains(slot)) {
            Some(index) => Err(ClapbindError::UnmatchedParameter {
                position: index + 1,
                accepted: self.accepted.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn join_or(names: &[String]) -> String {
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// `type_name` with module paths removed, generics kept:
/// `alloc::vec::Vec<my::Opts>` → `Vec<Opts>`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

/// Everything an action parameter can be filled from.
#[derive(Debug, Clone)]
pub struct Injectables<C, G> {
    pub args: Vec<String>,
    pub config: Option<C>,
    pub global: Option<G>,
    pub ctx: Context,
}

impl<C, G> Injectables<C, G> {
    pub fn offer(&self) -> Offer {
        Offer::new::<C, G>(self.config.is_some(), self.global.is_some())
    }
}

/// A parameter type an action may declare.
pub trait Inject<C, G>: Sized {
    const SLOT: Slot;
    fn inject(set: &Injectables<C, G>) -> Option<Self>;
}

impl<C, G> Inject<C, G> for Args {
    const SLOT: Slot = Slot::Args;
    fn inject(set: &Injectables<C, G>) -> Option<Self> {
        Some(Args(set.args.clone()))
    }
}

impl<C, G> Inject<C, G> for Context {
    const SLOT: Slot = Slot::Context;
    fn inject(set: &Injectables<C, G>) -> Option<Self> {
        Some(set.ctx.clone())
    }
}

impl<C: Clone, G> Inject<C, G> for Config<C> {
    const SLOT: Slot = Slot::Config;
    fn inject(set: &Injectables<C, G>) -> Option<Self> {
        set.config.clone().map(Config)
    }
}

impl<C, G: Clone> Inject<C, G> for Global<G> {
    const SLOT: Slot = Slot::Global;
    fn inject(set: &Injectables<C, G>) -> Option<Self> {
        set.global.clone().map(Global)
    }
}

/// Return types an action may have: success, or a failure with a message.
pub trait ActionResult {
    fn into_failure(self) -> Option<String>;
}

impl<E: Display> ActionResult for Result<(), E> {
    fn into_failure(self) -> Option<String> {
        self.err().map(|e| e.to_string())
    }
}

/// Implemented for every `Fn` of up to five injectable parameters.
pub trait Action<C, G, Params>: 'static {
    fn slots() -> Vec<Slot>;

    /// `None` when a parameter could not be filled; otherwise the failure
    /// message, if the action reported one.
    fn invoke(&self, set: &Injectables<C, G>) -> Option<Option<String>>;
}

macro_rules! impl_action {
    ($($param:ident),*) => {
        impl<F, Res, C, G, $($param,)*> Action<C, G, ($($param,)*)> for F
        where
            F: Fn($($param),*) -> Res + 'static,
            Res: ActionResult,
            $($param: Inject<C, G>,)*
        {
            fn slots() -> Vec<Slot> {
                vec![$(<$param as Inject<C, G>>::SLOT),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, set: &Injectables<C, G>) -> Option<Option<String>> {
                $(let $param = <$param as Inject<C, G>>::inject(set)?;)*
                Some((self)($($param),*).into_failure())
            }
        }
    };
}

impl_action!();
impl_action!(P1);
impl_action!(P1, P2);
impl_action!(P1, P2, P3);
impl_action!(P1, P2, P3, P4);
impl_action!(P1, P2, P3, P4, P5);

type Invoker<C, G> = Box<dyn Fn(&Injectables<C, G>) -> Option<Option<String>>>;

/// An action with its parameter types erased, ready to dispatch.
pub struct BoundAction<C, G> {
    slots: Vec<Slot>,
    invoke: Invoker<C, G>,
}

impl<C: 'static, G: 'static> BoundAction<C, G> {
    pub fn new<P: 'static, A>(action: A) -> Self
    where
        A: Action<C, G, P>,
    {
        Self {
            slots: A::slots(),
            invoke: Box::new(move |set| action.invoke(set)),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn takes(&self, slot: Slot) -> bool {
        self.slots.contains(&slot)
    }

    /// Check the declared parameters against `set`, then call the action.
    pub fn dispatch(&self, set: &Injectables<C, G>) -> Result<(), ClapbindError> {
        let offer = set.offer();
        offer.check(&self.slots)?;
        tracing::debug!(slots = ?self.slots, "dispatching action");
        match (self.invoke)(set) {
            Some(None) => Ok(()),
            Some(Some(failure)) => Err(ClapbindError::ActionFailed(failure)),
            None => Err(ClapbindError::UnmatchedParameter {
                position: 0,
                accepted: offer.accepted,
            }),
        }
    }
}
