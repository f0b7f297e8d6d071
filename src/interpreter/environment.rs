use crate::value::LoxValue;
use compact_str::CompactString;
use std::collections::HashMap;

/// Handle to one scope in an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(u32);

#[derive(Debug, Default)]
struct Scope {
    values: HashMap<CompactString, LoxValue>,
    parent: Option<ScopeId>,
}

/// Arena of lexical scopes.
///
/// Scopes are created and released in stack order, so the live scopes always
/// form a single chain from the innermost block back to the globals.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Number of live scopes, globals included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            values: HashMap::new(),
            parent: Some(parent),
        });
        ScopeId(self.scopes.len() as u32 - 1)
    }

    /// Releases `scope` together with any scope nested inside it.
    pub fn exit_scope(&mut self, scope: ScopeId) {
        debug_assert!(scope != self.global(), "The global scope is never released.");
        self.scopes.truncate(scope.0 as usize);
    }

    /// Binds `name` in `scope`, replacing any binding of the same name there.
    pub fn declare(&mut self, scope: ScopeId, name: &str, value: LoxValue) {
        self.scopes[scope.0 as usize]
            .values
            .insert(name.into(), value);
    }

    /// Looks `name` up from `scope` outwards.
    pub fn access(&self, scope: ScopeId, name: &str) -> Option<&LoxValue> {
        let owner = self.resolve(scope, name)?;
        self.scopes[owner.0 as usize].values.get(name)
    }

    /// Overwrites the nearest existing binding of `name`. Hands the value back
    /// if no enclosing scope defines the name.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: LoxValue) -> Result<(), LoxValue> {
        match self.resolve(scope, name) {
            Some(owner) => {
                self.scopes[owner.0 as usize]
                    .values
                    .insert(name.into(), value);
                Ok(())
            }
            None => Err(value),
        }
    }

    fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id.0 as usize)?;
            if scope.values.contains_key(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use crate::value::LoxValue;

    #[test]
    fn inner_scope_shadows_and_releases() {
        let mut environment = Environment::new();
        let global = environment.global();
        environment.declare(global, "a", LoxValue::Number(1.0));

        let inner = environment.enter_scope(global);
        environment.declare(inner, "a", LoxValue::Number(2.0));
        assert_eq!(environment.access(inner, "a"), Some(&LoxValue::Number(2.0)));
        environment.exit_scope(inner);

        assert_eq!(environment.depth(), 1);
        assert_eq!(environment.access(global, "a"), Some(&LoxValue::Number(1.0)));
    }

    #[test]
    fn assignment_walks_outwards_without_creating_bindings() {
        let mut environment = Environment::new();
        let global = environment.global();
        environment.declare(global, "a", LoxValue::Nil);

        let inner = environment.enter_scope(global);
        assert!(environment
            .assign(inner, "a", LoxValue::Bool(true))
            .is_ok());
        assert_eq!(
            environment.assign(inner, "b", LoxValue::Nil),
            Err(LoxValue::Nil)
        );
        environment.exit_scope(inner);

        assert_eq!(environment.access(global, "a"), Some(&LoxValue::Bool(true)));
        assert_eq!(environment.access(global, "b"), None);
    }

    #[test]
    fn redeclaration_overwrites_in_place() {
        let mut environment = Environment::new();
        let global = environment.global();
        environment.declare(global, "a", LoxValue::String("true".into()));
        environment.declare(global, "a", LoxValue::Bool(false));
        assert_eq!(environment.access(global, "a"), Some(&LoxValue::Bool(false)));
    }
}
