//! Per-request rendering options.

/// Deepest chain of nested declarators or definitions one request may build.
///
/// Anything deeper can only come from a cyclic symbol graph.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Radix used for enumerant values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumRadix
{
    /// `0x10`, masked to the enumerant type width
    #[default]
    Hex,
    /// `16`
    Decimal,
}

/// Options threaded through one synthesis request.
///
/// The value is immutable: every `with_*` builder returns a modified copy, so a
/// recursive call can narrow the options for a child (a parameter name, a
/// suppressed return type) without affecting its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOptions
{
    name: Option<String>,
    param_names: Vec<Option<String>>,
    class_name: Option<String>,
    show_return: bool,
    force_calling_convention: bool,
    enum_radix: EnumRadix,
    show_hooks: bool,
    metadata_comments: bool,
    depth: usize,
}

impl Default for DeclarationOptions
{
    fn default() -> Self
    {
        Self {
            name: None,
            param_names: Vec::new(),
            class_name: None,
            show_return: true,
            force_calling_convention: false,
            enum_radix: EnumRadix::Hex,
            show_hooks: false,
            metadata_comments: false,
            depth: 0,
        }
    }
}

impl DeclarationOptions
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Declarator name (variable, parameter or function name).
    #[must_use]
    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    /// Parameter names, `None` for an anonymous slot.
    #[must_use]
    pub fn param_names(&self) -> &[Option<String>]
    {
        &self.param_names
    }

    /// Class qualifying a member-pointer declarator.
    #[must_use]
    pub fn class_name(&self) -> Option<&str>
    {
        self.class_name.as_deref()
    }

    #[must_use]
    pub fn show_return(&self) -> bool
    {
        self.show_return
    }

    /// Render the calling convention even when it is the default one.
    #[must_use]
    pub fn force_calling_convention(&self) -> bool
    {
        self.force_calling_convention
    }

    #[must_use]
    pub fn enum_radix(&self) -> EnumRadix
    {
        self.enum_radix
    }

    /// Emit the private `hook_method` section in UDT definitions.
    #[must_use]
    pub fn show_hooks(&self) -> bool
    {
        self.show_hooks
    }

    /// Append `// <attr=value> ...` comments to generated lines.
    #[must_use]
    pub fn metadata_comments(&self) -> bool
    {
        self.metadata_comments
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self
    {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_param_names(mut self, param_names: Vec<Option<String>>) -> Self
    {
        self.param_names = param_names;
        self
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self
    {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn with_show_return(mut self, show_return: bool) -> Self
    {
        self.show_return = show_return;
        self
    }

    #[must_use]
    pub fn with_force_calling_convention(mut self, force: bool) -> Self
    {
        self.force_calling_convention = force;
        self
    }

    #[must_use]
    pub fn with_enum_radix(mut self, radix: EnumRadix) -> Self
    {
        self.enum_radix = radix;
        self
    }

    #[must_use]
    pub fn with_show_hooks(mut self, show_hooks: bool) -> Self
    {
        self.show_hooks = show_hooks;
        self
    }

    #[must_use]
    pub fn with_metadata_comments(mut self, metadata_comments: bool) -> Self
    {
        self.metadata_comments = metadata_comments;
        self
    }

    /// How many nested declarators or definitions enclose this request.
    #[must_use]
    pub fn depth(&self) -> usize
    {
        self.depth
    }

    /// Options for a nested type reference: only `name` changes, and the
    /// function-specific fields go back to their defaults.
    #[must_use]
    pub fn for_nested(&self, name: Option<&str>) -> Self
    {
        Self {
            name: name.map(str::to_string),
            param_names: Vec::new(),
            class_name: None,
            show_return: true,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Same options one nesting level down, for nested definitions.
    #[must_use]
    pub fn for_nested_definition(&self) -> Self
    {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults()
    {
        let options = DeclarationOptions::default();
        assert_eq!(options.name(), None);
        assert!(options.show_return());
        assert!(!options.force_calling_convention());
        assert_eq!(options.enum_radix(), EnumRadix::Hex);
        assert!(!options.show_hooks());
    }

    #[test]
    fn test_builders_copy()
    {
        let base = DeclarationOptions::new().with_enum_radix(EnumRadix::Decimal);
        let named = base.clone().with_name("x").with_show_return(false);
        assert_eq!(base.name(), None);
        assert_eq!(named.name(), Some("x"));
        assert!(base.show_return());
        assert_eq!(named.enum_radix(), EnumRadix::Decimal);
    }

    #[test]
    fn test_for_nested_resets_function_fields()
    {
        let options = DeclarationOptions::new()
            .with_name("Attack")
            .with_param_names(vec![Some("target".to_string())])
            .with_class_name("CNpc")
            .with_show_return(false)
            .with_show_hooks(true);
        let nested = options.for_nested(Some("target"));
        assert_eq!(nested.name(), Some("target"));
        assert!(nested.param_names().is_empty());
        assert_eq!(nested.class_name(), None);
        assert!(nested.show_return());
        assert!(nested.show_hooks());
        assert_eq!(nested.depth(), 1);
        assert_eq!(nested.for_nested_definition().depth(), 2);
        assert_eq!(options.depth(), 0);
    }
}
