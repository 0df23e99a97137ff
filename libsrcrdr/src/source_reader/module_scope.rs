// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `module_scope` module defines the named module scopes found in a source file, and the warnings emitted when
//! module directives are unbalanced.
//!
//! A module has an interface and one or more bodies, each opened by a directive and closed by its matching end
//! directive. The directives recorded while a module is active belong to that module: they are undone when the
//! module is left and re-applied whenever it is entered again.
//!
//! Leaving a module never fails either: an undo the host rejects is logged and counted, and the module is left
//! anyway.
//!
//! Scope anomalies never fail. Each produces a [ModuleWarning] and a best-effort correction so reading can go on:
//! - a second interface for a module is ignored;
//! - a body with no interface assumes an empty interface;
//! - a new module directive while another module is active ends that module first;
//! - an end directive that names the wrong module or phase ends the active module instead.

use std::fmt;

use tracing::{debug, warn};

use crate::core::{AtomId, FileLine};
use crate::directive::{DirectiveError, DirectiveLog};
use crate::host::{AtomTable, DirectiveExecutor};

/// The phase of a module being read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ModulePhase {
    Interface,
    Body,
}

impl ModulePhase {
    /// The name of the directive that opens this phase: `module` or `body`.
    pub fn directive_name(&self) -> &'static str {
        match self {
            ModulePhase::Interface => "module",
            ModulePhase::Body => "body",
        }
    }
}

impl fmt::Display for ModulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulePhase::Interface => write!(f, "interface"),
            ModulePhase::Body => write!(f, "body"),
        }
    }
}

/// A module found in the source file.
#[derive(Debug, Clone)]
pub struct Module {
    name: AtomId,
    interface_def: FileLine,    // Where the module was first seen.
    body_def: Option<FileLine>, // Where its most recent body starts.
    directives: DirectiveLog,   // Directives of the interface and all bodies.
}

impl Module {
    /// The module's name.
    pub fn name(&self) -> AtomId {
        self.name
    }

    /// Where the module was first seen, normally its interface.
    pub fn interface_def(&self) -> FileLine {
        self.interface_def
    }

    /// Where the module's most recent body starts, if a body was opened.
    pub fn body_def(&self) -> Option<FileLine> {
        self.body_def
    }

    /// The directives recorded while the module was active.
    pub fn directives(&self) -> &DirectiveLog {
        &self.directives
    }

    /// Where the given phase of the module starts.
    fn definition(&self, phase: ModulePhase) -> FileLine {
        match phase {
            ModulePhase::Interface => self.interface_def,
            ModulePhase::Body => self.body_def.unwrap_or(self.interface_def),
        }
    }
}

/// A soft diagnostic about unbalanced or repeated module directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleWarning {
    /// A body was opened for a module whose interface was never seen.
    InterfaceAssumedEmpty { module: String },

    /// An interface was opened for a module that already exists.
    AlreadyDefined { module: String, file: String, line: i32 },

    /// A module phase was still open when a new module directive, or the end of the file, was reached.
    EndNotEncountered { phase: ModulePhase, module: String },

    /// An end directive was found with no module active.
    StartNotFound { phase: ModulePhase, module: String },

    /// An end directive did not match the active module; the active module was ended instead.
    Mismatch { file: String, line: i32, phase: ModulePhase, module: String },
}

impl fmt::Display for ModuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleWarning::InterfaceAssumedEmpty { module } => {
                write!(f, "module({module}) not encountered - interface assumed empty")
            }
            ModuleWarning::AlreadyDefined { module, file, line } => {
                write!(f, "module({module}) already found at {file}:{line} - directive ignored")
            }
            ModuleWarning::EndNotEncountered { phase, module } => {
                write!(f, "end_{}({module}) not encountered - assumed found", phase.directive_name())
            }
            ModuleWarning::StartNotFound { phase, module } => {
                let directive = phase.directive_name();
                write!(f, "corresponding directive {directive}({module}) not found - directive ignored")
            }
            ModuleWarning::Mismatch { file, line, phase, module } => {
                let directive = phase.directive_name();
                write!(f, "directive mismatch wrt {file}:{line} - replaced by end_{directive}({module})")
            }
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct ActiveModule {
    index: usize,
    phase: ModulePhase,
}

/// The modules of a session and the one being read, if any.
#[derive(Debug, Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    active: Option<ActiveModule>,
    undo_failures: u32, // Undos rejected while leaving a module
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { modules: Vec::new(), active: None, undo_failures: 0 }
    }

    /// The number of modules found so far.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no module was found.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The number of directive undos the host rejected while modules were being left.
    pub fn undo_failures(&self) -> u32 {
        self.undo_failures
    }

    /// The modules, in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Finds a module by name.
    pub fn get(&self, name: AtomId) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// The active module and its phase.
    pub fn active(&self) -> Option<(&Module, ModulePhase)> {
        self.active.map(|active| (&self.modules[active.index], active.phase))
    }

    /// The directive log of the active module.
    pub(super) fn active_directives_mut(&mut self) -> Option<&mut DirectiveLog> {
        let active = self.active?;
        Some(&mut self.modules[active.index].directives)
    }

    /// Enters the given phase of a module, creating the module on first sight. `at` is the location of the module
    /// directive.
    ///
    /// An active module is left first. Entering re-applies the module's recorded directives; the module stays
    /// active if one of them fails. Warnings are returned in the order they arose.
    pub fn start<H>(
        &mut self,
        name: AtomId,
        phase: ModulePhase,
        at: FileLine,
        host: &mut H,
    ) -> Result<Vec<ModuleWarning>, DirectiveError>
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        let existing = self.modules.iter().position(|m| m.name == name);

        if let (Some(index), ModulePhase::Interface) = (existing, phase) {
            let def = self.modules[index].interface_def;
            return Ok(vec![ModuleWarning::AlreadyDefined {
                module: host.atom_name(name).to_string(),
                file: host.atom_name(def.file).to_string(),
                line: def.line,
            }]);
        }

        let mut warnings = Vec::new();

        if existing.is_none() && phase == ModulePhase::Body {
            warnings.push(ModuleWarning::InterfaceAssumedEmpty { module: host.atom_name(name).to_string() });
        }

        warnings.extend(self.assume_end(host));

        let index = existing.unwrap_or_else(|| {
            self.modules.push(Module { name, interface_def: at, body_def: None, directives: DirectiveLog::new() });
            self.modules.len() - 1
        });

        if phase == ModulePhase::Body {
            self.modules[index].body_def = Some(at);
        }

        self.active = Some(ActiveModule { index, phase });
        debug!(module = host.atom_name(name), %phase, "module entered");

        self.modules[index].directives.replay_forward(host)?;

        Ok(warnings)
    }

    /// Leaves the active module in response to an end directive for the given module and phase.
    ///
    /// If the directive does not match, the active module is still the one left.
    pub fn stop<H>(&mut self, name: AtomId, phase: ModulePhase, host: &mut H) -> Option<ModuleWarning>
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        let Some(active) = self.active else {
            return Some(ModuleWarning::StartNotFound { phase, module: host.atom_name(name).to_string() });
        };

        let module = &self.modules[active.index];

        let warning = if phase != active.phase || name != module.name {
            let def = module.definition(active.phase);
            Some(ModuleWarning::Mismatch {
                file: host.atom_name(def.file).to_string(),
                line: def.line,
                phase: active.phase,
                module: host.atom_name(module.name).to_string(),
            })
        } else {
            None
        };

        self.close_active(host);

        warning
    }

    /// Leaves the active module, if any, because its end directive was never found.
    pub fn assume_end<H>(&mut self, host: &mut H) -> Option<ModuleWarning>
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        let (module, phase) = self.active()?;

        let warning = ModuleWarning::EndNotEncountered { phase, module: host.atom_name(module.name).to_string() };

        self.close_active(host);

        Some(warning)
    }

    /// Undoes the active module's directives, most recent first, and clears the active module.
    ///
    /// Every directive is undone even if the host rejects some of them; rejections are logged and counted.
    fn close_active<H>(&mut self, host: &mut H)
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        let Some(active) = self.active.take() else {
            return;
        };

        let module = &self.modules[active.index];
        let name = host.atom_name(module.name).to_string();
        debug!(module = %name, phase = %active.phase, "module left");

        let mut failures = 0;
        module.directives.undo_each(host, |err| {
            warn!(module = %name, error = %err, "cannot undo directive");
            failures += 1;
        });

        self.undo_failures = self.undo_failures.saturating_add(failures);
    }
}
