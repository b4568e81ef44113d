use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use symdecl_core::decl::{self, DeclarationOptions, EnumRadix};
use symdecl_core::describe::describe;
use symdecl_core::symbol::{ChildFilter, Relation};
use symdecl_core::{Node, SymbolArena, SymbolId, SymbolKind};
use symdecl_utils::{debug, info, init_logging, RenderConfig};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Reconstruct C/C++ declarations from a compiler debug-information symbol graph.
#[derive(Parser, Debug)]
#[command(name = "symdecl")]
#[command(version)]
#[command(about = "Reconstruct C/C++ declarations from a debug-information symbol graph", long_about = None)]
struct Cli
{
    /// JSON symbol graph to read
    graph: PathBuf,
    /// Render configuration file (defaults to $SYMDECL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit the private hook_method section in struct/class definitions
    #[arg(long, default_value_t = false)]
    hooks: bool,
    /// Print enum values in decimal instead of hex
    #[arg(long, default_value_t = false)]
    decimal: bool,
    /// Append `// <attr=value>` metadata comments
    #[arg(long, default_value_t = false)]
    metadata: bool,
    /// Always print calling conventions
    #[arg(long, default_value_t = false)]
    force_callconv: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Dump every schema attribute of a symbol
    Describe
    {
        /// Symbol id
        id: u32,
    },
    /// Declare a type symbol
    Type
    {
        /// Symbol id
        id: u32,
        /// Declarator name to attach
        #[arg(long)]
        name: Option<String>,
    },
    /// Define a struct, class or union
    Udt
    {
        /// Fully qualified name
        name: String,
    },
    /// Define an enum
    Enum
    {
        /// Fully qualified name
        name: String,
    },
    /// Define the virtual table of a struct or class
    Vtable
    {
        /// Fully qualified name of the owning struct or class
        name: String,
    },
    /// Define a global, static or constant data symbol
    Data
    {
        /// Fully qualified name
        name: String,
    },
    /// Declare a function
    Function
    {
        /// Fully qualified name
        name: String,
    },
    /// Count the symbols under the root by kind
    Counts,
    /// Define every enum under the root
    Enums
    {
        /// Skip enums nested inside a struct or class
        #[arg(long, default_value_t = false)]
        skip_nested: bool,
    },
    /// Define every struct, class and union, with its size
    Udts
    {
        /// Only those of this byte size
        #[arg(long)]
        length: Option<u64>,
    },
    /// Define every data symbol under the root, with its size
    Datas
    {
        /// Only those whose name contains this text
        #[arg(long)]
        contains: Option<String>,
    },
    /// Declare every type of one kind under the root
    Types
    {
        #[arg(value_enum)]
        kind: TypeListing,
    },
    /// Dump the symbols with this name, their type and their children
    Children
    {
        /// Exact name
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TypeListing
{
    /// Function types, as (member) function pointers
    Function,
    /// Pointer and reference types
    Pointer,
    /// Array types
    Array,
    /// Basic types
    Base,
}

impl TypeListing
{
    fn kind(self) -> SymbolKind
    {
        match self {
            Self::Function => SymbolKind::FunctionType,
            Self::Pointer => SymbolKind::PointerType,
            Self::Array => SymbolKind::ArrayType,
            Self::Base => SymbolKind::BaseType,
        }
    }
}

fn main()
{
    // Logs go to stderr; stdout carries declarations only
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    let cli = Cli::parse();

    match run_command(cli) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// File settings first, then command-line switches on top.
fn render_options(cli: &Cli) -> CliResult<DeclarationOptions>
{
    let config = RenderConfig::discover(cli.config.as_deref())?;
    let mut options = config.to_options();
    if cli.hooks {
        options = options.with_show_hooks(true);
    }
    if cli.decimal {
        options = options.with_enum_radix(EnumRadix::Decimal);
    }
    if cli.metadata {
        options = options.with_metadata_comments(true);
    }
    if cli.force_callconv {
        options = options.with_force_calling_convention(true);
    }
    Ok(options)
}

fn run_command(cli: Cli) -> CliResult<Vec<String>>
{
    let options = render_options(&cli)?;
    info!("Loading symbol graph {}", cli.graph.display());
    let arena = SymbolArena::load(&cli.graph)?;
    debug!("Loaded {} symbols", arena.len());
    let root = Node::fetch(&arena, arena.root())?;

    let lines = match cli.command {
        Commands::Describe { id } => describe(&arena, SymbolId(id))?,
        Commands::Type { id, name } => {
            let ty = Node::fetch(&arena, SymbolId(id))?;
            let options = match name {
                Some(name) => options.with_name(name),
                None => options,
            };
            vec![decl::types::declare(ty, &options)?]
        }
        Commands::Udt { name } => decl::udt::define_lines(find(root, SymbolKind::Udt, &name)?, &options)?,
        Commands::Enum { name } => decl::enums::define_lines(find(root, SymbolKind::Enum, &name)?, &options)?,
        Commands::Vtable { name } => decl::vtable::define_lines(find(root, SymbolKind::Udt, &name)?, &options)?,
        Commands::Data { name } => decl::data::define_lines(find(root, SymbolKind::Data, &name)?, &options)?,
        Commands::Function { name } => vec![declare_function(find(root, SymbolKind::Function, &name)?, &options)?],
        Commands::Counts => counts(root)?,
        Commands::Enums { skip_nested } => all_enums(root, skip_nested, &options)?,
        Commands::Udts { length } => all_udts(root, length, &options)?,
        Commands::Datas { contains } => all_datas(root, contains.as_deref(), &options)?,
        Commands::Types { kind } => all_types(root, kind, &options)?,
        Commands::Children { name } => children_named(&arena, root, &name)?,
    };
    Ok(lines)
}

/// First child of the root with this kind and exact name.
fn find<'a>(root: Node<'a>, kind: SymbolKind, name: &str) -> CliResult<Node<'a>>
{
    let found = root.children(&ChildFilter::of_kind(kind).named(name))?;
    if found.len() > 1 {
        debug!("{} symbols named {}, using the first", found.len(), name);
    }
    match found.first() {
        Some(node) => Ok(*node),
        None => Err(format!("No {} named {name}", kind.name()).into()),
    }
}

/// Declare a function the way its class definition lists it.
fn declare_function(function: Node<'_>, options: &DeclarationOptions) -> CliResult<String>
{
    // Constructors are recognized against the unqualified class name
    let class_name = match function.related(Relation::ClassParent)? {
        Some(class) => Some(class.simple_name()?),
        None => None,
    };
    Ok(decl::function::declare_member(function, class_name.as_deref(), options)?)
}

fn counts(root: Node<'_>) -> CliResult<Vec<String>>
{
    let mut totals: BTreeMap<&'static str, usize> = BTreeMap::new();
    for child in root.children(&ChildFilter::all())? {
        *totals.entry(child.kind().name()).or_default() += 1;
    }
    Ok(totals.into_iter().map(|(kind, count)| format!("{kind}: {count}")).collect())
}

fn all_enums(root: Node<'_>, skip_nested: bool, options: &DeclarationOptions) -> CliResult<Vec<String>>
{
    let mut lines = Vec::new();
    for symbol in root.children(&ChildFilter::of_kind(SymbolKind::Enum))? {
        if skip_nested && is_nested(symbol)? {
            debug!("Skipping nested enum {}", symbol.id());
            continue;
        }
        lines.extend(decl::enums::define_lines(symbol, options)?);
        lines.push(String::new());
    }
    Ok(lines)
}

fn is_nested(symbol: Node<'_>) -> CliResult<bool>
{
    Ok(symbol.related(Relation::ClassParent)?.is_some() || symbol.name()?.contains("::"))
}

fn all_udts(root: Node<'_>, length: Option<u64>, options: &DeclarationOptions) -> CliResult<Vec<String>>
{
    let mut lines = Vec::new();
    let mut skipped = 0;
    for symbol in root.children(&ChildFilter::of_kind(SymbolKind::Udt))? {
        let size = symbol.length()?;
        if length.is_some_and(|length| length != size) {
            skipped += 1;
            continue;
        }
        let declaration = decl::udt::declare(symbol)?;
        lines.push(String::new());
        lines.push(format!("sizeof({declaration}) == {size}"));
        lines.extend(decl::udt::define_lines(symbol, options)?);
    }
    if skipped > 0 {
        debug!("Skipped {skipped} UDTs of another size");
    }
    Ok(lines)
}

fn all_datas(root: Node<'_>, contains: Option<&str>, options: &DeclarationOptions) -> CliResult<Vec<String>>
{
    let mut lines = Vec::new();
    for symbol in root.children(&ChildFilter::of_kind(SymbolKind::Data))? {
        let name = symbol.name()?;
        if contains.is_some_and(|text| !name.contains(text)) {
            continue;
        }
        lines.push(String::new());
        lines.extend(decl::data::define_lines(symbol, options)?);
        let size = decl::types::size_of(symbol.require(Relation::Type)?)?;
        lines.push(format!("sizeof({name}) == {size}"));
    }
    Ok(lines)
}

fn all_types(root: Node<'_>, listing: TypeListing, options: &DeclarationOptions) -> CliResult<Vec<String>>
{
    let mut lines = Vec::new();
    for ty in root.children(&ChildFilter::of_kind(listing.kind()))? {
        lines.push(String::new());
        if listing == TypeListing::Function {
            let options = match ty.related(Relation::ClassParent)? {
                Some(class) => options.clone().with_class_name(class.name()?),
                None => options.clone(),
            };
            lines.push(decl::types::declare_function_pointer(ty, &options)?);
            continue;
        }
        let declaration = decl::types::declare(ty, options)?;
        let size = decl::types::size_of(ty)?;
        lines.push(format!("sizeof({declaration}) == {size}"));
    }
    Ok(lines)
}

fn children_named(arena: &SymbolArena, root: Node<'_>, name: &str) -> CliResult<Vec<String>>
{
    let mut lines = Vec::new();
    for symbol in root.children(&ChildFilter::all().named(name))? {
        lines.push(String::new());
        lines.extend(describe(arena, symbol.id())?);
        if let Some(ty) = symbol.related(Relation::Type)? {
            lines.push(format!("-- type of {}", symbol.id()));
            lines.extend(describe(arena, ty.id())?);
        }
        for child in symbol.children(&ChildFilter::all())? {
            lines.push(format!("-- child of {}", symbol.id()));
            lines.extend(describe(arena, child.id())?);
        }
    }
    Ok(lines)
}
