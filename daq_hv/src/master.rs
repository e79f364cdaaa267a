//! Verb parsing and uniform per-channel dispatch.

use crate::address::{ChannelAddress, Segment};
use crate::channel::{ChannelInfo, ChannelStatus};
use crate::config::HvConfig;
use crate::error::{HvError, HvResult};
use crate::hvcrate::HvCrate;
use crate::snapshot;
use daq_confdb::ConfigStore;
use tracing::{info, warn};

/// The closed set of control verbs.
///
/// The per-channel verbs (`show`, `set`, `get`) all share one handler
/// shape - [`HvCommand::apply`] - which the master resolves once per
/// command and then runs on every matched channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvCommand {
    /// Print usage.
    Help,
    /// Display matched channels.
    Show,
    /// Set a configuration parameter on matched channels.
    Set,
    /// Read a parameter from matched channels.
    Get,
    /// Persist all crate grids as a new version.
    Save,
    /// Restore all crate grids from a stored version.
    Recall,
    /// List stored versions.
    List,
    /// Remove one stored version.
    Remove,
    /// Leave the console.
    Quit,
}

impl HvCommand {
    /// Parse a lowercase verb name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "help" => Some(Self::Help),
            "show" => Some(Self::Show),
            "set" => Some(Self::Set),
            "get" => Some(Self::Get),
            "save" => Some(Self::Save),
            "recall" => Some(Self::Recall),
            "list" => Some(Self::List),
            "remove" => Some(Self::Remove),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Verb name as typed on the console.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Show => "show",
            Self::Set => "set",
            Self::Get => "get",
            Self::Save => "save",
            Self::Recall => "recall",
            Self::List => "list",
            Self::Remove => "remove",
            Self::Quit => "quit",
        }
    }

    /// Whether this verb runs per channel (show/set/get).
    pub const fn is_channel_command(self) -> bool {
        matches!(self, Self::Show | Self::Set | Self::Get)
    }

    /// The uniform per-channel handler.
    ///
    /// Runs this verb against one channel's Info and Status. Returns the
    /// text to display for the channel, if any. Only meaningful for
    /// [channel commands](Self::is_channel_command).
    pub fn apply(
        self,
        info: &mut ChannelInfo,
        status: &mut ChannelStatus,
        param: Option<&str>,
        value: Option<&str>,
    ) -> HvResult<Option<String>> {
        match self {
            Self::Show => Ok(Some(format!(
                "voltage={} vlimit={} climit={} vmon={} imon={} switch={}{}",
                info.nominal_voltage,
                info.voltage_limit,
                info.current_limit,
                status.voltage,
                status.current,
                if status.is_on() { "on" } else { "off" },
                if status.flags.contains(crate::channel::StatusFlags::TRIPPED) {
                    " TRIPPED"
                } else {
                    ""
                },
            ))),

            Self::Set => {
                let name = param.ok_or(HvError::MissingArgument {
                    what: "parameter name (<name>=<value>)",
                })?;
                let value = value.ok_or(HvError::MissingArgument {
                    what: "parameter value (<name>=<value>)",
                })?;

                match name {
                    "switch" => match value {
                        "on" => {
                            status.set_switch(true);
                            Ok(None)
                        }
                        "off" => {
                            status.set_switch(false);
                            Ok(None)
                        }
                        _ => Err(HvError::BadValue {
                            param: name.to_string(),
                            value: value.to_string(),
                        }),
                    },
                    "vmon" | "imon" => Err(HvError::ReadOnlyParam {
                        name: name.to_string(),
                    }),
                    _ => info.set_param(name, value).map(|()| None),
                }
            }

            Self::Get => {
                let name = param.ok_or(HvError::MissingArgument {
                    what: "parameter name",
                })?;
                let value = match name {
                    "vmon" => status.voltage.to_string(),
                    "imon" => status.current.to_string(),
                    "switch" => if status.is_on() { "on" } else { "off" }.to_string(),
                    _ => info
                        .get_param(name)
                        .ok_or_else(|| HvError::UnknownParam {
                            name: name.to_string(),
                        })?
                        .to_string(),
                };
                Ok(Some(format!("{name}={value}")))
            }

            _ => Err(HvError::BadCommand {
                text: self.name().to_string(),
            }),
        }
    }
}

/// Result of one executed command.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Channels the handler ran on successfully.
    pub matched: usize,
    /// Lines to display.
    pub output: Vec<String>,
    /// Whether the console should exit.
    pub quit: bool,
}

/// Dispatches control verbs across the crate hierarchy.
pub struct HvControlMaster {
    crates: Vec<HvCrate>,
    store: ConfigStore,
}

impl HvControlMaster {
    /// Build a master over `crates`, persisting through `store`.
    pub fn new(crates: Vec<HvCrate>, store: ConfigStore) -> Self {
        Self { crates, store }
    }

    /// Build a master from a validated [`HvConfig`].
    pub fn from_config(config: &HvConfig) -> HvResult<Self> {
        let crates = config
            .crates
            .iter()
            .map(|t| HvCrate::new(t.id, t.slots, t.channels))
            .collect();
        let store = ConfigStore::open(&config.store_dir)?;
        Ok(Self::new(crates, store))
    }

    /// Controlled crates.
    pub fn crates(&self) -> &[HvCrate] {
        &self.crates
    }

    /// Look up one crate by id.
    pub fn crate_by_id(&self, id: u32) -> Option<&HvCrate> {
        self.crates.iter().find(|c| c.id() == id)
    }

    /// Look up one crate by id, mutable.
    pub fn crate_by_id_mut(&mut self, id: u32) -> Option<&mut HvCrate> {
        self.crates.iter_mut().find(|c| c.id() == id)
    }

    /// Execute a channel verb against an address range.
    ///
    /// `param`/`value` carry the `<name>` and `<value>` of `set`/`get`.
    /// The handler is resolved once and applied to every matched channel;
    /// per-channel failures do not stop the remaining channels, and the
    /// call succeeds only if every matched channel succeeded.
    pub fn execute(
        &mut self,
        verb: &str,
        address: &str,
        param: Option<&str>,
        value: Option<&str>,
    ) -> HvResult<Outcome> {
        let command = HvCommand::from_name(verb).ok_or_else(|| HvError::BadCommand {
            text: verb.to_string(),
        })?;
        if !command.is_channel_command() {
            return Err(HvError::BadCommand {
                text: verb.to_string(),
            });
        }
        let address: ChannelAddress = address.parse()?;
        self.apply_channel_command(command, &address, param, value)
    }

    fn apply_channel_command(
        &mut self,
        command: HvCommand,
        address: &ChannelAddress,
        param: Option<&str>,
        value: Option<&str>,
    ) -> HvResult<Outcome> {
        let mut applied = 0usize;
        let mut failed = 0usize;
        let mut output = Vec::new();

        for hv_crate in &mut self.crates {
            if !address.crate_id.matches(hv_crate.id()) {
                continue;
            }
            let crate_id = hv_crate.id();

            let slots: Vec<u32> = match address.slot {
                Segment::All => (0..hv_crate.slots()).collect(),
                Segment::Index(slot) => vec![slot],
            };
            for slot in slots {
                let channels: Vec<u32> = match address.channel {
                    Segment::All => (0..hv_crate.channels_per_slot()).collect(),
                    Segment::Index(channel) => vec![channel],
                };
                for channel in channels {
                    let Some(entry) = hv_crate.channel_mut(slot, channel) else {
                        warn!(crate_id, slot, channel, "addressed channel does not exist");
                        failed += 1;
                        continue;
                    };
                    match command.apply(&mut entry.info, &mut entry.status, param, value) {
                        Ok(Some(text)) => {
                            output.push(format!("{crate_id}.{slot}.{channel} {text}"));
                            applied += 1;
                        }
                        Ok(None) => applied += 1,
                        Err(e) => {
                            warn!(crate_id, slot, channel, error = %e, "channel command failed");
                            failed += 1;
                        }
                    }
                }
            }
        }

        if applied == 0 && failed == 0 {
            return Err(HvError::NoMatch {
                address: address.to_string(),
            });
        }
        if failed > 0 {
            return Err(HvError::BatchFailed { failed, applied });
        }

        info!(
            verb = command.name(),
            address = %address,
            channels = applied,
            "channel command applied"
        );
        Ok(Outcome {
            matched: applied,
            output,
            quit: false,
        })
    }

    /// Parse and execute one console line.
    pub fn execute_line(&mut self, line: &str) -> HvResult<Outcome> {
        let mut tokens = line.split_whitespace();
        let Some(verb_text) = tokens.next() else {
            return Ok(Outcome::default());
        };
        let command = HvCommand::from_name(verb_text).ok_or_else(|| HvError::BadCommand {
            text: verb_text.to_string(),
        })?;

        match command {
            HvCommand::Help => Ok(Outcome {
                output: usage_lines(),
                ..Outcome::default()
            }),

            HvCommand::Quit => Ok(Outcome {
                quit: true,
                ..Outcome::default()
            }),

            HvCommand::Show | HvCommand::Set | HvCommand::Get => {
                let address: ChannelAddress = tokens
                    .next()
                    .ok_or(HvError::MissingArgument {
                        what: "channel address (<crate>.<slot>.<channel>)",
                    })?
                    .parse()?;

                let (param, value) = match command {
                    HvCommand::Set => {
                        let assignment = tokens.next().ok_or(HvError::MissingArgument {
                            what: "<name>=<value>",
                        })?;
                        let (name, value) =
                            assignment
                                .split_once('=')
                                .ok_or(HvError::MissingArgument {
                                    what: "<name>=<value>",
                                })?;
                        (Some(name), Some(value))
                    }
                    HvCommand::Get => {
                        let name = tokens.next().ok_or(HvError::MissingArgument {
                            what: "parameter name",
                        })?;
                        (Some(name), None)
                    }
                    _ => (None, None),
                };

                self.apply_channel_command(command, &address, param, value)
            }

            HvCommand::Save => {
                let version = match parse_version(tokens.next())? {
                    Some(version) => version,
                    None => self.next_version()?,
                };
                snapshot::save_crates(&self.store, &self.crates, version)?;
                Ok(Outcome {
                    matched: self.channel_count(),
                    output: vec![format!("saved version {version}")],
                    quit: false,
                })
            }

            HvCommand::Recall => {
                let version = match parse_version(tokens.next())? {
                    Some(version) => version,
                    None => self.latest_version()?,
                };
                snapshot::recall_crates(&self.store, &mut self.crates, version)?;
                Ok(Outcome {
                    matched: self.channel_count(),
                    output: vec![format!("recalled version {version}")],
                    quit: false,
                })
            }

            HvCommand::List => {
                let versions = snapshot::saved_versions(&self.store, &self.crates)?;
                let output = if versions.is_empty() {
                    vec!["no saved versions".to_string()]
                } else {
                    versions.iter().map(|v| format!("version {v}")).collect()
                };
                Ok(Outcome {
                    output,
                    ..Outcome::default()
                })
            }

            HvCommand::Remove => {
                let version =
                    parse_version(tokens.next())?.ok_or(HvError::MissingArgument {
                        what: "version to remove",
                    })?;
                let removed = snapshot::remove_version(&self.store, &self.crates, version)?;
                if removed == 0 {
                    return Err(HvError::NoSuchVersion { version });
                }
                Ok(Outcome {
                    output: vec![format!("removed version {version}")],
                    ..Outcome::default()
                })
            }
        }
    }

    fn channel_count(&self) -> usize {
        self.crates
            .iter()
            .map(|c| (c.slots() * c.channels_per_slot()) as usize)
            .sum()
    }

    fn next_version(&self) -> HvResult<u32> {
        Ok(snapshot::saved_versions(&self.store, &self.crates)?
            .last()
            .map_or(1, |v| v + 1))
    }

    fn latest_version(&self) -> HvResult<u32> {
        snapshot::saved_versions(&self.store, &self.crates)?
            .last()
            .copied()
            .ok_or(HvError::NothingSaved)
    }
}

fn parse_version(token: Option<&str>) -> HvResult<Option<u32>> {
    match token {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| HvError::BadValue {
            param: "version".to_string(),
            value: text.to_string(),
        }),
    }
}

fn usage_lines() -> Vec<String> {
    [
        "show <crate>.<slot>.<channel>            display matched channels",
        "set  <crate>.<slot>.<channel> <p>=<v>    set a parameter (voltage, vlimit, climit, rampup, rampdown, switch)",
        "get  <crate>.<slot>.<channel> <p>        read a parameter (also vmon, imon)",
        "save [version]                           persist all crates as a new version",
        "recall [version]                         restore a stored version (default: latest)",
        "list                                     list stored versions",
        "remove <version>                         delete one stored version",
        "quit                                     leave the console",
        "",
        "address segments may be '*' meaning all",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
