//! Fun command group
//!
//! Handles: flip, roll, pick, 8ball, steal, emote, rng
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add big-integer `rng`
//! - 1.0.0: Coin flips, dice, picks, 8-ball and emote commands

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::commands::arguments::ArgumentBag;
use crate::commands::context::ExecutionContext;
use crate::commands::descriptor::CommandDescriptor;
use crate::commands::handler::{CommandGroup, CommandHandler};
use crate::commands::transformer::{TrBigInt, TrGreedy, TrInt, TrRest, TrSplit};
use crate::core::Embed;
use crate::platform::{Emote, HistoryMessage};

const EMOJI_RADIO_BUTTON: &str = "🔘";
const EMOJI_GAME_DIE: &str = "🎲";
const EMOJI_THINKING: &str = "🤔";
const EMOJI_BILLIARD_BALL: &str = "🎱";
const EMOJI_1234: &str = "🔢";

/// Most coins `flip` will throw at once
pub const MAX_FLIPS: i64 = 292;
/// Emote lines per direct message sent by `steal`
const STEAL_CHUNK: usize = 20;

const EIGHT_BALL_RESPONSES: &[&str] = &[
    "It is certain.",
    "It is decidedly so.",
    "Without a doubt.",
    "Yes - definitely.",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

pub struct FunCommands;

impl CommandGroup for FunCommands {
    fn name(&self) -> &'static str {
        "Fun"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        vec![
            CommandDescriptor::builder("flip")
                .aliases(&["coin", "flipcoin"])
                .description("Flips coins.")
                .extended_description(
                    "If an argument is provided, this command flips `times` coins, displaying \
                     all of the flip results. If no argument is provided, this command will \
                     flip one coin.",
                )
                .arg(TrInt::optional(1).named("times"))
                .execute(Flip),
            CommandDescriptor::builder("roll")
                .aliases(&["dice", "rolldice"])
                .description("Rolls dice with RPG style roll specifiers.")
                .extended_description(
                    "Rolls dice according to roll specifiers. Some examples are:\n\
                     - `d6`: rolls a six-sided die\n\
                     - `2d8`: rolls two eight-sided dice\n\
                     - `d20+1`: rolls a twenty-sided die and adds one to the result\n\
                     - `3d4-2`: rolls three four-sided dice and subtracts two from the result\n\
                     If no specifiers are provided, a single `d6` is used.",
                )
                .arg(
                    TrGreedy::new(DiceRoll::parse)
                        .with_default(vec![DiceRoll::D6])
                        .named("rolls"),
                )
                .execute(Roll),
            CommandDescriptor::builder("pick")
                .aliases(&["select", "choose"])
                .description("Picks a value from the options you give.")
                .extended_description(
                    "Picks a value from `options`, which is a list of choices separated by `|` \
                     surrounded by spaces (so you can use the pipe in an option for things like \
                     `Wolfram|Alpha`).",
                )
                .arg(TrSplit::on(" | ").named("options"))
                .execute(Pick),
            CommandDescriptor::builder("8ball")
                .aliases(&["magiceightball"])
                .description("Uncover secrets with the 100% reliable Magic 8 Ball!")
                .extended_description(
                    "Ask the Magic 8 Ball a question and it will undoubtedly tell you the truth \
                     (unless it's tired, in which case you should simply ask again, politely).",
                )
                .arg(TrRest::new().named("question"))
                .execute(EightBall),
            CommandDescriptor::builder("steal")
                .aliases(&["stealemotes"])
                .description("Steals emotes from message history in the current channel.")
                .extended_description(
                    "Steals custom emotes from the current channel's history. If `limit` is \
                     specified, this command will attempt to steal all emotes from the past \
                     `limit` messages. If not, the default is the past 100 messages.",
                )
                .arg(TrInt::optional(100).named("limit"))
                .execute(Steal),
            CommandDescriptor::builder("emote")
                .aliases(&["emotes"])
                .description("Sends emotes from servers I'm in by your choice.")
                .extended_description(
                    "Sends every emote named in `names`. If I can't see one of them, nothing \
                     is sent.",
                )
                .arg(TrGreedy::new(|token: &str| Some(token.to_string())).named("names"))
                .execute(SendEmotes),
            CommandDescriptor::builder("rng")
                .aliases(&["random"])
                .description("Picks a random integer.")
                .extended_description(
                    "Picks a random integer between `low` and `high` inclusive. Both bounds \
                     default to 1 and 100, and may be very large.",
                )
                .arg(TrBigInt::optional(1).named("low"))
                .arg(TrBigInt::optional(100).named("high"))
                .execute(RandomNumber),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinFace {
    Heads,
    Tails,
}

impl fmt::Display for CoinFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinFace::Heads => write!(f, "heads"),
            CoinFace::Tails => write!(f, "tails"),
        }
    }
}

pub fn flip_coins(times: usize) -> Vec<CoinFace> {
    let mut rng = rand::rng();
    (0..times)
        .map(|_| {
            if rng.random_bool(0.5) {
                CoinFace::Heads
            } else {
                CoinFace::Tails
            }
        })
        .collect()
}

/// Title line: the single face, or a heads/tails tally
pub fn summarize_flips(flips: &[CoinFace]) -> String {
    match flips {
        [single] => single.to_string(),
        _ => {
            let heads = flips.iter().filter(|f| **f == CoinFace::Heads).count();
            format!("{heads} heads and {} tails", flips.len() - heads)
        }
    }
}

fn bracketed<T: fmt::Display>(items: &[T]) -> String {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

struct Flip;

#[async_trait]
impl CommandHandler for Flip {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let times = *args.get::<i64>(0)?;
        if !(1..=MAX_FLIPS).contains(&times) {
            ctx.reply_error("I can't flip that number of coins!").await?;
            return Ok(());
        }

        let flips = flip_coins(times as usize);
        let embed = Embed::new()
            .title(format!(
                "{EMOJI_RADIO_BUTTON}  You flipped {}!",
                summarize_flips(&flips)
            ))
            .description(bracketed(&flips));
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

/// One `NdS±M` roll specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub times: i64,
    pub sides: i64,
    pub modifier: i64,
}

impl DiceRoll {
    pub const D6: DiceRoll = DiceRoll {
        times: 1,
        sides: 6,
        modifier: 0,
    };

    /// Parse `d6`, `2d8`, `d20+1`, `3d4-2`
    pub fn parse(token: &str) -> Option<DiceRoll> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"^(?i)(\d*)d(\d+)([+-]\d+)?$").ok())
            .as_ref()?;
        let captures = pattern.captures(token)?;

        let times = match captures.get(1).map(|m| m.as_str()) {
            Some("") | None => 1,
            Some(times) => times.parse().ok()?,
        };
        let sides = captures.get(2)?.as_str().parse().ok()?;
        let modifier = match captures.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(DiceRoll {
            times,
            sides,
            modifier,
        })
    }

    /// Reason this roll is refused, if any
    pub fn check_limits(&self) -> Option<&'static str> {
        if !(1..=100).contains(&self.times) {
            Some("I can't roll a die that many times!")
        } else if !(1..=1000).contains(&self.sides) {
            Some("I can't roll a die with that many sides!")
        } else if !(-10_000..=10_000).contains(&self.modifier) {
            Some("That modifier is too big or small!")
        } else {
            None
        }
    }

    fn modifier_text(&self) -> String {
        match self.modifier {
            0 => String::new(),
            m if m > 0 => format!("+{m}"),
            m => m.to_string(),
        }
    }
}

struct Roll;

#[async_trait]
impl CommandHandler for Roll {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let rolls = args.get::<Vec<DiceRoll>>(0)?;
        if let Some(reason) = rolls.iter().find_map(DiceRoll::check_limits) {
            ctx.reply_error(reason).await?;
            return Ok(());
        }

        let results: Vec<Vec<i64>> = {
            let mut rng = rand::rng();
            rolls
                .iter()
                .map(|roll| {
                    (0..roll.times)
                        .map(|_| rng.random_range(1..=roll.sides))
                        .collect()
                })
                .collect()
        };
        let total: i64 = results.iter().flatten().sum::<i64>()
            + rolls.iter().map(|r| r.modifier).sum::<i64>();
        let total_of = if rolls.len() > 1 { "total of " } else { "" };

        let description = rolls
            .iter()
            .zip(&results)
            .map(|(roll, result)| {
                let modifier = roll.modifier_text();
                format!(
                    "**{}d{}{modifier}**: {} {modifier}",
                    roll.times,
                    roll.sides,
                    bracketed(result)
                )
                .trim_end()
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = Embed::new()
            .title(format!("{EMOJI_GAME_DIE}  You rolled a {total_of}{total}!"))
            .description(description);
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

struct Pick;

#[async_trait]
impl CommandHandler for Pick {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let options = args.get::<Vec<String>>(0)?;
        if options.len() < 2 {
            ctx.reply_error("I need at least 2 options to choose from!")
                .await?;
            return Ok(());
        }

        let choice = options.choose(&mut rand::rng()).cloned().unwrap_or_default();
        let embed = Embed::new()
            .title(format!("{EMOJI_THINKING}  I choose **{choice}**!"))
            .description(bracketed(options));
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

struct EightBall;

#[async_trait]
impl CommandHandler for EightBall {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let question = args.get::<String>(0)?;
        if question.trim().is_empty() {
            ctx.reply_error("You have to ask me a question!").await?;
            return Ok(());
        }

        let answer = EIGHT_BALL_RESPONSES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or("Ask again later.");
        let embed = Embed::new()
            .title(format!("{EMOJI_BILLIARD_BALL}  The 8-ball says:"))
            .description(answer);
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

/// Custom emotes referenced in `content`, in order of appearance
pub fn extract_emotes(content: &str) -> Vec<Emote> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(pattern) = PATTERN
        .get_or_init(|| Regex::new(r"<(a?):(\w+):(\d+)>").ok())
        .as_ref()
    else {
        return Vec::new();
    };

    pattern
        .captures_iter(content)
        .filter_map(|captures| {
            Some(Emote {
                id: captures[3].parse().ok()?,
                name: captures[2].to_string(),
                animated: !captures[1].is_empty(),
            })
        })
        .collect()
}

/// Distinct emotes across `messages`, first occurrence wins
pub fn distinct_emotes(messages: &[HistoryMessage]) -> Vec<Emote> {
    let mut seen = HashSet::new();
    messages
        .iter()
        .flat_map(|message| extract_emotes(&message.content))
        .filter(|emote| seen.insert(emote.id))
        .collect()
}

struct Steal;

#[async_trait]
impl CommandHandler for Steal {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let limit = *args.get::<i64>(0)?;
        if !(1..=1000).contains(&limit) {
            ctx.reply_error("I can't steal from that many messages in history!")
                .await?;
            return Ok(());
        }

        let dm = ctx.platform().open_direct_channel(ctx.author().id).await?;
        ctx.send_to(dm, "✅ Your emotes are being processed!")
            .await?;

        let history = ctx
            .platform()
            .fetch_recent_messages(ctx.channel_id(), limit as usize)
            .await?;
        let emotes = distinct_emotes(&history);
        debug!(
            "[{}] Found {} distinct emotes in {} messages",
            ctx.request_id(),
            emotes.len(),
            history.len()
        );

        let lines: Vec<String> = emotes
            .iter()
            .map(|emote| format!("**{}**: <{}>", emote.name, emote.image_url()))
            .collect();
        for chunk in lines.chunks(STEAL_CHUNK) {
            ctx.send_to(dm, format!("*::*\n{}", chunk.join("\n")))
                .await?;
        }

        ctx.reply_success("Your stolen emotes have been sent to you!")
            .await?;
        Ok(())
    }
}

struct SendEmotes;

#[async_trait]
impl CommandHandler for SendEmotes {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let names = args.get::<Vec<String>>(0)?;
        if names.is_empty() {
            ctx.reply_error("Tell me which emotes to send!").await?;
            return Ok(());
        }

        let mut mentions = Vec::with_capacity(names.len());
        for name in names {
            match ctx.platform().find_emote(name).await {
                Some(emote) => mentions.push(emote.mention()),
                None => {
                    ctx.reply_error("I don't have access to one or more of those emotes!")
                        .await?;
                    return Ok(());
                }
            }
        }

        let phrase = if mentions.len() == 1 {
            "is your emote"
        } else {
            "are your emotes"
        };
        ctx.reply_success(format!("Here {phrase}: {}", mentions.join(" ")))
            .await?;
        Ok(())
    }
}

struct RandomNumber;

#[async_trait]
impl CommandHandler for RandomNumber {
    async fn execute(&self, ctx: &ExecutionContext, args: &ArgumentBag) -> Result<()> {
        let low = *args.get::<i128>(0)?;
        let high = *args.get::<i128>(1)?;
        if low > high {
            ctx.reply_error("The lower bound can't be bigger than the upper bound!")
                .await?;
            return Ok(());
        }

        let value = rand::rng().random_range(low..=high);
        let embed = Embed::new()
            .title(format!("{EMOJI_1234}  Your random number is **{value}**!"))
            .description(format!("Picked from {low} to {high}."));
        ctx.reply_embed(embed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatcher::DispatchState;
    use crate::commands::handlers::testing::{invoke, member};
    use crate::platform::testing::{user, FakePlatform};
    use crate::platform::{ChannelId, MessageId};
    use std::sync::Arc;

    fn emote(id: u64, name: &str) -> Emote {
        Emote {
            id,
            name: name.to_string(),
            animated: false,
        }
    }

    fn history(content: &str) -> HistoryMessage {
        HistoryMessage {
            id: MessageId(1),
            author: user(9, "someone", 1),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_summarize_flips() {
        use CoinFace::*;
        assert_eq!(summarize_flips(&[Tails]), "tails");
        assert_eq!(
            summarize_flips(&[Heads, Tails, Heads]),
            "2 heads and 1 tails"
        );
        assert_eq!(flip_coins(5).len(), 5);
    }

    #[test]
    fn test_dice_roll_parse() {
        assert_eq!(DiceRoll::parse("d6"), Some(DiceRoll::D6));
        assert_eq!(
            DiceRoll::parse("3d4-2"),
            Some(DiceRoll {
                times: 3,
                sides: 4,
                modifier: -2
            })
        );
        assert_eq!(
            DiceRoll::parse("D20+1"),
            Some(DiceRoll {
                times: 1,
                sides: 20,
                modifier: 1
            })
        );
        assert_eq!(DiceRoll::parse("banana"), None);
        assert_eq!(DiceRoll::parse("2d"), None);
        assert_eq!(
            DiceRoll::parse("101d6").and_then(|r| r.check_limits()),
            Some("I can't roll a die that many times!")
        );
    }

    #[test]
    fn test_extract_emotes() {
        let found = extract_emotes("hi <:bean:123> and <a:dance:456> <:broken:>");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], emote(123, "bean"));
        assert!(found[1].animated);
        assert_eq!(found[1].mention(), "<a:dance:456>");
    }

    #[test]
    fn test_distinct_emotes_across_history() {
        let messages = vec![
            history("<:bean:1> <:bean:1>"),
            history("<:cat:2>"),
            history("<:bean:1> plain text"),
        ];
        let names: Vec<_> = distinct_emotes(&messages)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["bean", "cat"]);
    }

    #[tokio::test]
    async fn test_flip_three_tallies() {
        let platform = Arc::new(FakePlatform::new());
        let outcome = invoke(&platform, member(), "..flip 3").await;
        assert_eq!(outcome.state(), DispatchState::Executed);

        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        let embed = sent[0].1.embed.clone().unwrap();
        let description = embed.description.unwrap();
        let faces: Vec<&str> = description
            .trim_matches(|c| c == '[' || c == ']')
            .split(", ")
            .collect();
        assert_eq!(faces.len(), 3);
        let heads = faces.iter().filter(|f| **f == "heads").count();
        let tails = faces.iter().filter(|f| **f == "tails").count();
        assert_eq!(heads + tails, 3);
        assert_eq!(
            embed.title.unwrap(),
            format!("{EMOJI_RADIO_BUTTON}  You flipped {heads} heads and {tails} tails!")
        );
    }

    #[tokio::test]
    async fn test_flip_zero_rejected() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..coin 0").await;
        assert_eq!(
            platform.sent_text(),
            vec!["❌ I can't flip that number of coins!"]
        );
    }

    #[tokio::test]
    async fn test_flip_defaults_to_one() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..flip").await;
        let title = platform.sent()[0].1.embed.clone().unwrap().title.unwrap();
        assert!(title.ends_with("heads!") || title.ends_with("tails!"));
    }

    #[tokio::test]
    async fn test_pick_among_three() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..pick a | b | c").await;
        let embed = platform.sent()[0].1.embed.clone().unwrap();
        assert_eq!(embed.description.as_deref(), Some("[a, b, c]"));
        let title = embed.title.unwrap();
        assert!(["a", "b", "c"]
            .iter()
            .any(|o| title == format!("{EMOJI_THINKING}  I choose **{o}**!")));
    }

    #[tokio::test]
    async fn test_pick_needs_two_options() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..choose only one").await;
        assert_eq!(
            platform.sent_text(),
            vec!["❌ I need at least 2 options to choose from!"]
        );
    }

    #[tokio::test]
    async fn test_roll_stops_at_first_unparsable_token() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..roll 2d1+3 d1 because").await;
        let embed = platform.sent()[0].1.embed.clone().unwrap();
        assert_eq!(
            embed.title.as_deref(),
            Some("🎲  You rolled a total of 6!")
        );
        assert_eq!(
            embed.description.as_deref(),
            Some("**2d1+3**: [1, 1] +3\n**1d1**: [1]")
        );
    }

    #[tokio::test]
    async fn test_roll_limits() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..dice d5000").await;
        assert_eq!(
            platform.sent_text(),
            vec!["❌ I can't roll a die with that many sides!"]
        );
    }

    #[tokio::test]
    async fn test_eight_ball_requires_question() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..8ball").await;
        invoke(&platform, member(), "..8ball will it rain?").await;
        let sent = platform.sent_text();
        assert_eq!(sent[0], "❌ You have to ask me a question!");
        assert!(EIGHT_BALL_RESPONSES
            .iter()
            .any(|answer| sent[1].ends_with(answer)));
    }

    #[tokio::test]
    async fn test_steal_sends_emotes_by_dm() {
        let platform = Arc::new(FakePlatform::new().with_history(vec![
            history("look <:bean:11>"),
            history("<a:dance:12> <:bean:11>"),
        ]));
        invoke(&platform, member(), "..steal 50").await;

        let sent = platform.sent();
        let dm = ChannelId(member().id.0);
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].0, dm);
        assert_eq!(sent[1].0, dm);
        assert_eq!(
            sent[1].1.content.as_deref(),
            Some(
                "*::*\n**bean**: <https://cdn.discordapp.com/emojis/11.png>\n\
                 **dance**: <https://cdn.discordapp.com/emojis/12.gif>"
            )
        );
        assert_eq!(sent[2].0, ChannelId(500));
    }

    #[tokio::test]
    async fn test_steal_limit_range() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..steal 5000").await;
        assert_eq!(
            platform.sent_text(),
            vec!["❌ I can't steal from that many messages in history!"]
        );
    }

    #[tokio::test]
    async fn test_emote_all_must_resolve() {
        let platform =
            Arc::new(FakePlatform::new().with_emotes(vec![emote(1, "bean"), emote(2, "cat")]));
        invoke(&platform, member(), "..emote bean CAT").await;
        invoke(&platform, member(), "..emotes bean dog").await;
        assert_eq!(
            platform.sent_text(),
            vec![
                "✅ Here are your emotes: <:bean:1> <:cat:2>",
                "❌ I don't have access to one or more of those emotes!",
            ]
        );
    }

    #[tokio::test]
    async fn test_rng_bounds() {
        let platform = Arc::new(FakePlatform::new());
        invoke(&platform, member(), "..rng 99999999999999999999 99999999999999999999").await;
        invoke(&platform, member(), "..rng 10 1").await;
        let sent = platform.sent_text();
        assert!(sent[0].contains("**99999999999999999999**"));
        assert_eq!(
            sent[1],
            "❌ The lower bound can't be bigger than the upper bound!"
        );
    }
}
