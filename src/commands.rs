use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use voxedit_core::{BlockPos, DimensionId, MatchMode, VoxelStore};
use voxedit_edit::{parse_block_spec, BlockMask, EditEngine, EditError, Liquid, Pattern, Region};
use voxedit_world::{EntityTypeFilter, KillFlags, Universe, World};

const NO_PERMISSION: &str = "You are not permitted to do that. Are you in the right mode?";
const NUMBER_EXPECTED: &str = "Number expected; string given.";
const REMOVE_NEAR_DEFAULT_SIZE: i32 = 50;
const SNOW_DEFAULT_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<EditError> for CommandError {
    fn from(err: EditError) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Fill,
    FillRecursive,
    Drain,
    FixLava,
    FixWater,
    RemoveAbove,
    RemoveBelow,
    RemoveNear,
    ReplaceNear,
    Snow,
    Thaw,
    Green,
    Extinguish,
    Butcher,
    Remove,
    Help,
    Undo,
    Redo,
}

/// One row of the command table.
///
/// An alias starting with `/` is typed with two slashes in chat (`//fill`).
#[derive(Debug)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub desc: &'static str,
    /// Single-letter flags the command accepts.
    pub flags: &'static str,
    pub min_args: usize,
    /// `None` is unbounded.
    pub max_args: Option<usize>,
    pub permission: Option<&'static str>,
    /// Whether the console may run it.
    pub console: bool,
}

impl CommandSpec {
    /// How the primary alias is typed in chat.
    pub fn display_name(&self) -> String {
        format!("/{}", self.aliases[0])
    }

    fn usage_line(&self) -> String {
        if self.usage.is_empty() {
            self.display_name()
        } else {
            format!("{} {}", self.display_name(), self.usage)
        }
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::Fill,
        aliases: &["/fill"],
        usage: "<block> <radius> [depth]",
        desc: "Fill a hole",
        flags: "",
        min_args: 2,
        max_args: Some(3),
        permission: Some("worldedit.fill"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::FillRecursive,
        aliases: &["/fillr"],
        usage: "<block> <radius> [depth]",
        desc: "Fill a hole recursively",
        flags: "",
        min_args: 2,
        max_args: Some(3),
        permission: Some("worldedit.fill.recursive"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Drain,
        aliases: &["/drain"],
        usage: "<radius>",
        desc: "Drain a pool",
        flags: "",
        min_args: 1,
        max_args: Some(1),
        permission: Some("worldedit.drain"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::FixLava,
        aliases: &["/fixlava", "fixlava"],
        usage: "<radius>",
        desc: "Fix lava to be stationary",
        flags: "",
        min_args: 1,
        max_args: Some(1),
        permission: Some("worldedit.fixlava"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::FixWater,
        aliases: &["/fixwater", "fixwater"],
        usage: "<radius>",
        desc: "Fix water to be stationary",
        flags: "",
        min_args: 1,
        max_args: Some(1),
        permission: Some("worldedit.fixwater"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::RemoveAbove,
        aliases: &["/removeabove", "removeabove"],
        usage: "[size] [height]",
        desc: "Remove blocks above your head.",
        flags: "",
        min_args: 0,
        max_args: Some(2),
        permission: Some("worldedit.removeabove"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::RemoveBelow,
        aliases: &["/removebelow", "removebelow"],
        usage: "[size] [height]",
        desc: "Remove blocks below you.",
        flags: "",
        min_args: 0,
        max_args: Some(2),
        permission: Some("worldedit.removebelow"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::RemoveNear,
        aliases: &["/removenear", "removenear"],
        usage: "<block> [size]",
        desc: "Remove blocks near you.",
        flags: "",
        min_args: 1,
        max_args: Some(2),
        permission: Some("worldedit.removenear"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::ReplaceNear,
        aliases: &["/replacenear", "replacenear"],
        usage: "<size> <from-id> <to-id>",
        desc: "Replace nearby blocks",
        flags: "f",
        min_args: 3,
        max_args: Some(3),
        permission: Some("worldedit.replacenear"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Snow,
        aliases: &["/snow", "snow"],
        usage: "[radius]",
        desc: "Simulates snow",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.snow"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Thaw,
        aliases: &["/thaw", "thaw"],
        usage: "[radius]",
        desc: "Thaws the area",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.thaw"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Green,
        aliases: &["/green", "green"],
        usage: "[radius]",
        desc: "Greens the area",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.green"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Extinguish,
        aliases: &["/ex", "/ext", "/extinguish", "ex", "ext", "extinguish"],
        usage: "[radius]",
        desc: "Extinguish nearby fire",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.extinguish"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Butcher,
        aliases: &["butcher"],
        usage: "[radius]",
        desc: "Kill all or nearby mobs",
        flags: "plan",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.butcher"),
        console: true,
    },
    CommandSpec {
        kind: CommandKind::Remove,
        aliases: &["remove", "rem", "rement"],
        usage: "<type> <radius>",
        desc: "Remove all entities of a type",
        flags: "",
        min_args: 2,
        max_args: Some(2),
        permission: Some("worldedit.remove"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Help,
        aliases: &["/help"],
        usage: "[<command>]",
        desc: "Displays help for the given command or lists all commands.",
        flags: "",
        min_args: 0,
        max_args: None,
        permission: None,
        console: true,
    },
    CommandSpec {
        kind: CommandKind::Undo,
        aliases: &["/undo", "undo"],
        usage: "[times]",
        desc: "Undoes the last action",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.history.undo"),
        console: false,
    },
    CommandSpec {
        kind: CommandKind::Redo,
        aliases: &["/redo", "redo"],
        usage: "[times]",
        desc: "Redoes the last action (from history)",
        flags: "",
        min_args: 0,
        max_args: Some(1),
        permission: Some("worldedit.history.redo"),
        console: false,
    },
];

/// Butcher flag, the permission node it needs, and the capability it grants.
const BUTCHER_FLAGS: &[(char, &str, KillFlags)] = &[
    ('p', "worldedit.butcher.pets", KillFlags::PETS),
    ('n', "worldedit.butcher.npcs", KillFlags::NPCS),
    ('a', "worldedit.butcher.animals", KillFlags::ANIMALS),
    ('l', "worldedit.butcher.lightning", KillFlags::WITH_LIGHTNING),
];

pub fn find_command(alias: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.aliases.iter().any(|a| a.eq_ignore_ascii_case(alias)))
}

/// A command line split into its table row, flags and positional arguments.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub spec: &'static CommandSpec,
    pub flags: BTreeSet<char>,
    pub args: Vec<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }

    fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    fn int(&self, index: usize) -> Result<Option<i32>, CommandError> {
        self.arg(index).map(parse_int).transpose()
    }

    fn double(&self, index: usize) -> Result<Option<f64>, CommandError> {
        self.arg(index).map(parse_double).transpose()
    }

    fn required(&self, index: usize) -> Result<&'a str, CommandError> {
        self.arg(index)
            .ok_or_else(|| CommandError::new(format!("Usage: {}", self.spec.usage_line())))
    }
}

fn parse_int(token: &str) -> Result<i32, CommandError> {
    token
        .parse::<i32>()
        .map_err(|_| CommandError::new(NUMBER_EXPECTED))
}

fn parse_double(token: &str) -> Result<f64, CommandError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::new(NUMBER_EXPECTED))
}

/// `-` followed by letters only, so `-1` stays a number.
fn is_flag_token(token: &str) -> bool {
    token
        .strip_prefix('-')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic()))
}

pub fn parse_command(input: &str) -> Result<Invocation<'_>, CommandError> {
    let input = input.trim();
    let mut tokens = input.split_whitespace();
    let head = tokens
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?;

    // One leading slash is the chat prefix; try the bare token too so console
    // input and chat input resolve the same.
    let spec = head
        .strip_prefix('/')
        .and_then(find_command)
        .or_else(|| find_command(head))
        .ok_or_else(|| {
            CommandError::new(format!("Unknown command: {head}. Try //help"))
        })?;

    let mut flags = BTreeSet::new();
    let mut args = Vec::new();
    for token in tokens {
        if is_flag_token(token) {
            for flag in token[1..].chars() {
                if !spec.flags.contains(flag) {
                    return Err(CommandError::new(format!("Unknown flag: {flag}")));
                }
                flags.insert(flag);
            }
        } else {
            args.push(token);
        }
    }

    if args.len() < spec.min_args {
        return Err(CommandError::new(format!(
            "Too few arguments. Usage: {}",
            spec.usage_line()
        )));
    }
    if spec.max_args.is_some_and(|max| args.len() > max) {
        return Err(CommandError::new(format!(
            "Too many arguments. Usage: {}",
            spec.usage_line()
        )));
    }

    Ok(Invocation { spec, flags, args })
}

/// Who is running a command.
pub trait CommandSender {
    fn name(&self) -> &str;

    /// Dimension and block position, `None` for the console.
    fn location(&self) -> Option<(DimensionId, BlockPos)>;

    fn has_permission(&self, node: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct PlayerSender {
    name: String,
    dimension: DimensionId,
    position: (f64, f64, f64),
    permissions: BTreeSet<String>,
}

impl PlayerSender {
    pub fn new(name: impl Into<String>, dimension: DimensionId, position: (f64, f64, f64)) -> Self {
        Self {
            name: name.into(),
            dimension,
            position,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(nodes.into_iter().map(Into::into));
        self
    }

    #[cfg(test)]
    pub fn teleport(&mut self, dimension: DimensionId, position: (f64, f64, f64)) {
        self.dimension = dimension;
        self.position = position;
    }
}

impl CommandSender for PlayerSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<(DimensionId, BlockPos)> {
        let (x, y, z) = self.position;
        Some((self.dimension, BlockPos::from_f64(x, y, z)))
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == "*"
                || granted == node
                || granted
                    .strip_suffix(".*")
                    .is_some_and(|prefix| node.starts_with(prefix) && node[prefix.len()..].starts_with('.'))
        })
    }
}

/// The server console: every permission, no position.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn name(&self) -> &str {
        "Console"
    }

    fn location(&self) -> Option<(DimensionId, BlockPos)> {
        None
    }

    fn has_permission(&self, _node: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub lines: Vec<OutputLine>,
}

impl CommandOutput {
    fn info(&mut self, text: impl Into<String>) {
        self.lines.push(OutputLine {
            kind: LineKind::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.lines.push(OutputLine {
            kind: LineKind::Error,
            text: text.into(),
        });
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        self.lines.iter().any(|line| line.kind == LineKind::Error)
    }
}

/// Parse and run one command line. Failures become error lines.
pub fn execute_command(
    sender: &dyn CommandSender,
    universe: &mut Universe,
    engine: &mut EditEngine,
    input: &str,
) -> CommandOutput {
    let mut out = CommandOutput::default();
    let result = parse_command(input).and_then(|invocation| {
        authorize(sender, invocation.spec)?;
        run(sender, universe, engine, &invocation, &mut out)
    });
    if let Err(err) = result {
        tracing::debug!(sender = sender.name(), input, %err, "command failed");
        out.error(err.to_string());
    }
    out
}

fn authorize(sender: &dyn CommandSender, spec: &CommandSpec) -> Result<(), CommandError> {
    if let Some(node) = spec.permission {
        if !sender.has_permission(node) {
            return Err(CommandError::new(NO_PERMISSION));
        }
    }
    if sender.location().is_none() && !spec.console {
        return Err(CommandError::new("This command must be used by a player."));
    }
    Ok(())
}

/// The sender's world and block position.
fn locate<'u>(
    sender: &dyn CommandSender,
    universe: &'u mut Universe,
) -> Result<(&'u mut World, BlockPos), CommandError> {
    let (dimension, pos) = sender
        .location()
        .ok_or_else(|| CommandError::new("This command must be used by a player."))?;
    let world = universe
        .get_mut(dimension)
        .ok_or_else(|| CommandError::new(format!("World {dimension} is not loaded.")))?;
    Ok((world, pos))
}

fn run(
    sender: &dyn CommandSender,
    universe: &mut Universe,
    engine: &mut EditEngine,
    cmd: &Invocation<'_>,
    out: &mut CommandOutput,
) -> Result<(), CommandError> {
    match cmd.spec.kind {
        CommandKind::Fill | CommandKind::FillRecursive => {
            let mut pattern: Pattern = cmd.required(0)?.parse()?;
            let radius = cmd.double(1)?.unwrap_or(1.0).max(1.0);
            let depth = cmd.int(2)?.map_or(1, |depth| depth.max(1));
            let (world, origin) = locate(sender, universe)?;
            let affected = if cmd.spec.kind == CommandKind::Fill {
                engine.fill(world, origin, &mut pattern, radius, depth)?
            } else {
                engine.fill_recursive(world, origin, &mut pattern, radius, depth)?
            };
            out.info(format!("{affected} block(s) have been created."));
        }
        CommandKind::Drain => {
            let radius = cmd.double(0)?.unwrap_or(0.0).max(0.0);
            let (world, origin) = locate(sender, universe)?;
            let affected = engine.drain_area(world, origin, radius)?;
            out.info(format!("{affected} block(s) have been changed."));
        }
        CommandKind::FixLava | CommandKind::FixWater => {
            let liquid = if cmd.spec.kind == CommandKind::FixLava {
                Liquid::Lava
            } else {
                Liquid::Water
            };
            let radius = cmd.double(0)?.unwrap_or(0.0).max(0.0);
            let (world, origin) = locate(sender, universe)?;
            let affected = engine.fix_liquid(world, origin, radius, liquid)?;
            out.info(format!("{affected} block(s) have been changed."));
        }
        CommandKind::RemoveAbove | CommandKind::RemoveBelow => {
            let size = cmd.int(0)?.map_or(1, |size| size.max(1));
            let (world, origin) = locate(sender, universe)?;
            let ceiling = world.max_y() + 1;
            let height = cmd
                .int(1)?
                .map_or(ceiling, |height| ceiling.min(height.saturating_add(2)));
            let affected = if cmd.spec.kind == CommandKind::RemoveAbove {
                engine.remove_above(world, origin, size, height)?
            } else {
                engine.remove_below(world, origin, size, height)?
            };
            out.info(format!("{affected} block(s) have been removed."));
        }
        CommandKind::RemoveNear => {
            // Data values are accepted but only the type is matched.
            let (block, _) = parse_block_spec(cmd.required(0)?)?;
            let size = cmd
                .int(1)?
                .map_or(REMOVE_NEAR_DEFAULT_SIZE, |size| size.max(1));
            let (world, origin) = locate(sender, universe)?;
            let affected = engine.remove_near(world, origin, block, size)?;
            out.info(format!("{affected} block(s) have been removed."));
        }
        CommandKind::ReplaceNear => {
            let size = cmd.int(0)?.map_or(1, |size| size.max(1));
            engine.check_max_radius(f64::from(size))?;
            let mode = if cmd.has_flag('f') {
                MatchMode::IgnoreData
            } else {
                MatchMode::Exact
            };
            let from = BlockMask::parse(cmd.required(1)?, mode)?;
            let mut to: Pattern = cmd.required(2)?.parse()?;
            let (world, origin) = locate(sender, universe)?;
            let region = Region::centered_cube(origin, size);
            let affected = engine.replace_blocks(world, &region, Some(&from), &mut to)?;
            out.info(format!("{affected} block(s) have been replaced."));
        }
        CommandKind::Snow | CommandKind::Thaw | CommandKind::Green => {
            let radius = cmd.double(0)?.map_or(SNOW_DEFAULT_RADIUS, |r| r.max(1.0));
            let (world, origin) = locate(sender, universe)?;
            let line = match cmd.spec.kind {
                CommandKind::Snow => {
                    let n = engine.simulate_snow(world, origin, radius)?;
                    format!("{n} surfaces covered. Let it snow~")
                }
                CommandKind::Thaw => {
                    let n = engine.thaw(world, origin, radius)?;
                    format!("{n} surfaces thawed.")
                }
                _ => {
                    let n = engine.green(world, origin, radius)?;
                    format!("{n} surfaces greened.")
                }
            };
            out.info(line);
        }
        CommandKind::Extinguish => {
            let size = cmd
                .int(0)?
                .map_or(engine.config().extinguish_default_radius(), |size| size.max(1));
            let (world, origin) = locate(sender, universe)?;
            let affected = engine.extinguish(world, origin, size)?;
            out.info(format!("{affected} block(s) have been removed."));
        }
        CommandKind::Butcher => {
            let radius = cmd
                .int(0)?
                .map_or(engine.config().butcher_default_radius, |r| r.max(1));
            let flags = butcher_flags(sender, cmd);
            let killed = match sender.location() {
                Some(_) => {
                    let (world, origin) = locate(sender, universe)?;
                    engine.kill_mobs(world, origin, radius, flags)
                }
                None => engine.kill_mobs_everywhere(universe, radius, flags),
            };
            out.info(format!("Killed {killed} mobs."));
        }
        CommandKind::Remove => {
            let type_name = cmd.required(0)?;
            let radius = parse_int(cmd.required(1)?)?;
            if radius < -1 {
                return Err(CommandError::new(
                    "Use -1 to remove all entities in loaded chunks",
                ));
            }
            let filter = EntityTypeFilter::parse(type_name).ok_or_else(|| {
                CommandError::new(format!(
                    "Acceptable types: {}",
                    EntityTypeFilter::ACCEPTABLE
                ))
            })?;
            let (world, origin) = locate(sender, universe)?;
            let marked = engine.remove_entities(world, filter, origin, radius);
            out.info(format!("Marked {marked} entit(ies) for removal."));
        }
        CommandKind::Help => {
            for line in help_lines(&cmd.args)? {
                out.info(line);
            }
        }
        CommandKind::Undo | CommandKind::Redo => {
            let times = cmd.int(0)?.map_or(1, |times| times.max(1));
            let undo = cmd.spec.kind == CommandKind::Undo;
            let (world, _) = locate(sender, universe)?;
            let mut done = 0;
            for _ in 0..times {
                let stepped = if undo {
                    engine.undo(world)
                } else {
                    engine.redo(world)
                };
                if !stepped {
                    break;
                }
                done += 1;
            }
            match (undo, done > 0) {
                (true, true) => out.info("Undo successful."),
                (true, false) => return Err(CommandError::new("Nothing left to undo.")),
                (false, true) => out.info("Redo successful."),
                (false, false) => return Err(CommandError::new("Nothing left to redo.")),
            }
        }
    }
    Ok(())
}

/// Requested butcher flags, minus those the sender lacks permission for.
fn butcher_flags(sender: &dyn CommandSender, cmd: &Invocation<'_>) -> KillFlags {
    BUTCHER_FLAGS
        .iter()
        .filter(|(flag, node, _)| cmd.has_flag(*flag) && sender.has_permission(node))
        .fold(KillFlags::empty(), |acc, (_, _, bit)| acc | *bit)
}

/// Bare alias listing without a topic; otherwise usage and description of
/// the command named by the slash-stripped, space-joined topic words.
fn help_lines(topic: &[&str]) -> Result<Vec<String>, CommandError> {
    if topic.is_empty() {
        let mut names: Vec<String> = COMMANDS
            .iter()
            .flat_map(|spec| spec.aliases.iter().map(|alias| format!("/{alias}")))
            .collect();
        names.sort_by(|a, b| {
            let key = |name: &str| name.replace('/', "").to_ascii_lowercase();
            key(a.as_str())
                .cmp(&key(b.as_str()))
                .then_with(|| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()))
        });
        return Ok(vec![names.join(", ")]);
    }

    let wanted = topic.join(" ").replace('/', "");
    let spec = COMMANDS
        .iter()
        .find(|spec| {
            spec.aliases
                .iter()
                .any(|alias| alias.trim_start_matches('/').eq_ignore_ascii_case(&wanted))
        })
        .ok_or_else(|| CommandError::new(format!("Unknown command '{wanted}'.")))?;
    Ok(vec![format!("Usage: {}", spec.usage_line()), spec.desc.to_string()])
}
