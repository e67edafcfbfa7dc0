//! IRC numeric replies as defined in RFC 1459 and RFC 2812

use crate::{Message, MessageType};

/// IRC numeric reply codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NumericReply {
    // Connection registration
    RplWelcome = 1,
    RplYourHost = 2,
    RplCreated = 3,
    RplMyInfo = 4,
    RplISupport = 5,

    // Command responses
    RplUModeIs = 221,
    RplLuserClient = 251,
    RplLuserOp = 252,
    RplLuserUnknown = 253,
    RplLuserChannels = 254,
    RplLuserMe = 255,
    RplAway = 301,
    RplUserHost = 302,
    RplIsOn = 303,
    RplUnAway = 305,
    RplNowAway = 306,
    RplWhoisUser = 311,
    RplWhoisServer = 312,
    RplWhoisOperator = 313,
    RplEndOfWho = 315,
    RplWhoisIdle = 317,
    RplEndOfWhois = 318,
    RplWhoisChannels = 319,
    RplListStart = 321,
    RplList = 322,
    RplListEnd = 323,
    RplChannelModeIs = 324,
    RplCreationTime = 329,
    RplNoTopic = 331,
    RplTopic = 332,
    RplTopicWhoTime = 333,
    RplInviting = 341,
    RplVersion = 351,
    RplWhoReply = 352,
    RplNameReply = 353,
    RplEndOfNames = 366,
    RplBanList = 367,
    RplEndOfBanList = 368,
    RplMotd = 372,
    RplMotdStart = 375,
    RplEndOfMotd = 376,
    RplTime = 391,

    // Error replies
    ErrNoSuchNick = 401,
    ErrNoSuchChannel = 403,
    ErrCannotSendToChan = 404,
    ErrTooManyChannels = 405,
    ErrNoOrigin = 409,
    ErrNoRecipient = 411,
    ErrNoTextToSend = 412,
    ErrUnknownCommand = 421,
    ErrNoMotd = 422,
    ErrNoNicknameGiven = 431,
    ErrErroneousNickname = 432,
    ErrNicknameInUse = 433,
    ErrUserNotInChannel = 441,
    ErrNotOnChannel = 442,
    ErrUserOnChannel = 443,
    ErrNotRegistered = 451,
    ErrNeedMoreParams = 461,
    ErrAlreadyRegistered = 462,
    ErrChannelIsFull = 471,
    ErrUnknownMode = 472,
    ErrInviteOnlyChan = 473,
    ErrBadChannelKey = 475,
    ErrBadChanName = 479,
    ErrChanOpPrivsNeeded = 482,
    ErrUsersDontMatch = 502,
}

impl NumericReply {
    /// Get the numeric code as a u16
    pub fn numeric_code(&self) -> u16 {
        *self as u16
    }

    /// Get the numeric code as a three digit string
    pub fn code(&self) -> String {
        format!("{:03}", self.numeric_code())
    }

    /// Create a numeric reply message addressed to `target`
    ///
    /// The server prefix is added when the reply is queued for delivery.
    pub fn reply(&self, target: &str, params: Vec<String>) -> Message {
        let mut all_params = vec![target.to_string()];
        all_params.extend(params);

        Message::new(MessageType::Custom(self.code()), all_params)
    }
}

/// Common numeric replies
impl NumericReply {
    /// RPL_WELCOME
    pub fn welcome(nick: &str, user: &str, host: &str, network: &str) -> Message {
        Self::RplWelcome.reply(
            nick,
            vec![format!(
                "Welcome to the {} Internet Relay Network {}!{}@{}",
                network, nick, user, host
            )],
        )
    }

    /// RPL_YOURHOST
    pub fn your_host(nick: &str, server: &str, version: &str) -> Message {
        Self::RplYourHost.reply(
            nick,
            vec![format!("Your host is {}, running version {}", server, version)],
        )
    }

    /// RPL_CREATED
    pub fn created(nick: &str, date: &str) -> Message {
        Self::RplCreated.reply(nick, vec![format!("This server was created {}", date)])
    }

    /// RPL_MYINFO
    pub fn my_info(
        nick: &str,
        server: &str,
        version: &str,
        user_modes: &str,
        channel_modes: &str,
    ) -> Message {
        Self::RplMyInfo.reply(
            nick,
            vec![
                server.to_string(),
                version.to_string(),
                user_modes.to_string(),
                channel_modes.to_string(),
            ],
        )
    }

    /// RPL_ISUPPORT
    pub fn isupport(nick: &str, tokens: &[String]) -> Message {
        let mut params = tokens.to_vec();
        params.push("are supported by this server".to_string());
        Self::RplISupport.reply(nick, params)
    }

    /// RPL_UMODEIS
    pub fn umode_is(nick: &str, modes: &str) -> Message {
        Self::RplUModeIs.reply(nick, vec![modes.to_string()])
    }

    /// RPL_LUSERCLIENT
    pub fn luser_client(nick: &str, users: usize) -> Message {
        Self::RplLuserClient.reply(
            nick,
            vec![format!("There are {} users and 0 services on 1 server", users)],
        )
    }

    /// RPL_LUSEROP
    pub fn luser_op(nick: &str, operators: usize) -> Message {
        Self::RplLuserOp.reply(
            nick,
            vec![operators.to_string(), "operator(s) online".to_string()],
        )
    }

    /// RPL_LUSERUNKNOWN
    pub fn luser_unknown(nick: &str, unknown: usize) -> Message {
        Self::RplLuserUnknown.reply(
            nick,
            vec![unknown.to_string(), "unknown connection(s)".to_string()],
        )
    }

    /// RPL_LUSERCHANNELS
    pub fn luser_channels(nick: &str, channels: usize) -> Message {
        Self::RplLuserChannels.reply(
            nick,
            vec![channels.to_string(), "channels formed".to_string()],
        )
    }

    /// RPL_LUSERME
    pub fn luser_me(nick: &str, clients: usize) -> Message {
        Self::RplLuserMe.reply(
            nick,
            vec![format!("I have {} clients and 0 servers", clients)],
        )
    }

    /// RPL_AWAY
    pub fn away(nick: &str, target: &str, message: &str) -> Message {
        Self::RplAway.reply(nick, vec![target.to_string(), message.to_string()])
    }

    /// RPL_USERHOST
    pub fn userhost(nick: &str, replies: &[String]) -> Message {
        Self::RplUserHost.reply(nick, vec![replies.join(" ")])
    }

    /// RPL_ISON
    pub fn ison(nick: &str, nicks: &[String]) -> Message {
        Self::RplIsOn.reply(nick, vec![nicks.join(" ")])
    }

    /// RPL_UNAWAY
    pub fn unaway(nick: &str) -> Message {
        Self::RplUnAway.reply(
            nick,
            vec!["You are no longer marked as being away".to_string()],
        )
    }

    /// RPL_NOWAWAY
    pub fn now_away(nick: &str) -> Message {
        Self::RplNowAway.reply(
            nick,
            vec!["You have been marked as being away".to_string()],
        )
    }

    /// RPL_WHOISUSER
    pub fn whois_user(nick: &str, target: &str, username: &str, host: &str, realname: &str) -> Message {
        Self::RplWhoisUser.reply(
            nick,
            vec![
                target.to_string(),
                username.to_string(),
                host.to_string(),
                "*".to_string(),
                realname.to_string(),
            ],
        )
    }

    /// RPL_WHOISSERVER
    pub fn whois_server(nick: &str, target: &str, server: &str, server_info: &str) -> Message {
        Self::RplWhoisServer.reply(
            nick,
            vec![target.to_string(), server.to_string(), server_info.to_string()],
        )
    }

    /// RPL_WHOISOPERATOR
    pub fn whois_operator(nick: &str, target: &str) -> Message {
        Self::RplWhoisOperator.reply(
            nick,
            vec![target.to_string(), "is an IRC operator".to_string()],
        )
    }

    /// RPL_WHOISIDLE
    pub fn whois_idle(nick: &str, target: &str, idle_secs: u64, signon: i64) -> Message {
        Self::RplWhoisIdle.reply(
            nick,
            vec![
                target.to_string(),
                idle_secs.to_string(),
                signon.to_string(),
                "seconds idle, signon time".to_string(),
            ],
        )
    }

    /// RPL_ENDOFWHOIS
    pub fn end_of_whois(nick: &str, target: &str) -> Message {
        Self::RplEndOfWhois.reply(
            nick,
            vec![target.to_string(), "End of WHOIS list".to_string()],
        )
    }

    /// RPL_WHOISCHANNELS
    pub fn whois_channels(nick: &str, target: &str, channels: &str) -> Message {
        Self::RplWhoisChannels.reply(nick, vec![target.to_string(), channels.to_string()])
    }

    /// RPL_WHOREPLY
    #[allow(clippy::too_many_arguments)]
    pub fn who_reply(
        nick: &str,
        channel: &str,
        username: &str,
        host: &str,
        server: &str,
        target: &str,
        flags: &str,
        realname: &str,
    ) -> Message {
        Self::RplWhoReply.reply(
            nick,
            vec![
                channel.to_string(),
                username.to_string(),
                host.to_string(),
                server.to_string(),
                target.to_string(),
                flags.to_string(),
                format!("0 {}", realname),
            ],
        )
    }

    /// RPL_ENDOFWHO
    pub fn end_of_who(nick: &str, mask: &str) -> Message {
        Self::RplEndOfWho.reply(nick, vec![mask.to_string(), "End of WHO list".to_string()])
    }

    /// RPL_LISTSTART
    pub fn list_start(nick: &str) -> Message {
        Self::RplListStart.reply(nick, vec!["Channel".to_string(), "Users  Name".to_string()])
    }

    /// RPL_LIST
    pub fn list(nick: &str, channel: &str, visible: usize, topic: &str) -> Message {
        Self::RplList.reply(
            nick,
            vec![channel.to_string(), visible.to_string(), topic.to_string()],
        )
    }

    /// RPL_LISTEND
    pub fn list_end(nick: &str) -> Message {
        Self::RplListEnd.reply(nick, vec!["End of LIST".to_string()])
    }

    /// RPL_CHANNELMODEIS
    pub fn channel_mode_is(nick: &str, channel: &str, modes: &str, mode_args: &[String]) -> Message {
        let mut params = vec![channel.to_string(), modes.to_string()];
        params.extend(mode_args.iter().cloned());
        Self::RplChannelModeIs.reply(nick, params)
    }

    /// RPL_CREATIONTIME
    pub fn creation_time(nick: &str, channel: &str, created: i64) -> Message {
        Self::RplCreationTime.reply(nick, vec![channel.to_string(), created.to_string()])
    }

    /// RPL_NOTOPIC
    pub fn no_topic(nick: &str, channel: &str) -> Message {
        Self::RplNoTopic.reply(
            nick,
            vec![channel.to_string(), "No topic is set".to_string()],
        )
    }

    /// RPL_TOPIC
    pub fn topic(nick: &str, channel: &str, topic: &str) -> Message {
        Self::RplTopic.reply(nick, vec![channel.to_string(), topic.to_string()])
    }

    /// RPL_TOPICWHOTIME
    pub fn topic_who_time(nick: &str, channel: &str, setter: &str, set_at: i64) -> Message {
        Self::RplTopicWhoTime.reply(
            nick,
            vec![channel.to_string(), setter.to_string(), set_at.to_string()],
        )
    }

    /// RPL_INVITING
    pub fn inviting(nick: &str, target: &str, channel: &str) -> Message {
        Self::RplInviting.reply(nick, vec![target.to_string(), channel.to_string()])
    }

    /// RPL_VERSION
    pub fn version(nick: &str, version: &str, server: &str, comments: &str) -> Message {
        Self::RplVersion.reply(
            nick,
            vec![format!("{}.", version), server.to_string(), comments.to_string()],
        )
    }

    /// RPL_NAMREPLY
    pub fn name_reply(nick: &str, symbol: &str, channel: &str, names: &str) -> Message {
        Self::RplNameReply.reply(
            nick,
            vec![symbol.to_string(), channel.to_string(), names.to_string()],
        )
    }

    /// RPL_ENDOFNAMES
    pub fn end_of_names(nick: &str, channel: &str) -> Message {
        Self::RplEndOfNames.reply(
            nick,
            vec![channel.to_string(), "End of NAMES list".to_string()],
        )
    }

    /// RPL_BANLIST
    pub fn ban_list(nick: &str, channel: &str, mask: &str) -> Message {
        Self::RplBanList.reply(nick, vec![channel.to_string(), mask.to_string()])
    }

    /// RPL_ENDOFBANLIST
    pub fn end_of_ban_list(nick: &str, channel: &str) -> Message {
        Self::RplEndOfBanList.reply(
            nick,
            vec![channel.to_string(), "End of channel ban list".to_string()],
        )
    }

    /// RPL_MOTDSTART
    pub fn motd_start(nick: &str, server: &str) -> Message {
        Self::RplMotdStart.reply(
            nick,
            vec![format!("- {} Message of the day - ", server)],
        )
    }

    /// RPL_MOTD
    pub fn motd_line(nick: &str, line: &str) -> Message {
        Self::RplMotd.reply(nick, vec![format!("- {}", line)])
    }

    /// RPL_ENDOFMOTD
    pub fn end_of_motd(nick: &str) -> Message {
        Self::RplEndOfMotd.reply(nick, vec!["End of MOTD command".to_string()])
    }

    /// RPL_TIME
    pub fn time(nick: &str, server: &str, time: &str) -> Message {
        Self::RplTime.reply(nick, vec![server.to_string(), time.to_string()])
    }

    /// ERR_NOSUCHNICK
    pub fn no_such_nick(nick: &str, target: &str) -> Message {
        Self::ErrNoSuchNick.reply(
            nick,
            vec![target.to_string(), "No such nick/channel".to_string()],
        )
    }

    /// ERR_NOSUCHCHANNEL
    pub fn no_such_channel(nick: &str, channel: &str) -> Message {
        Self::ErrNoSuchChannel.reply(
            nick,
            vec![channel.to_string(), "No such channel".to_string()],
        )
    }

    /// ERR_CANNOTSENDTOCHAN
    pub fn cannot_send_to_chan(nick: &str, channel: &str) -> Message {
        Self::ErrCannotSendToChan.reply(
            nick,
            vec![channel.to_string(), "Cannot send to channel".to_string()],
        )
    }

    /// ERR_TOOMANYCHANNELS
    pub fn too_many_channels(nick: &str, channel: &str) -> Message {
        Self::ErrTooManyChannels.reply(
            nick,
            vec![channel.to_string(), "You have joined too many channels".to_string()],
        )
    }

    /// ERR_NOORIGIN
    pub fn no_origin(nick: &str) -> Message {
        Self::ErrNoOrigin.reply(nick, vec!["No origin specified".to_string()])
    }

    /// ERR_NORECIPIENT
    pub fn no_recipient(nick: &str, command: &str) -> Message {
        Self::ErrNoRecipient.reply(nick, vec![format!("No recipient given ({})", command)])
    }

    /// ERR_NOTEXTTOSEND
    pub fn no_text_to_send(nick: &str) -> Message {
        Self::ErrNoTextToSend.reply(nick, vec!["No text to send".to_string()])
    }

    /// ERR_UNKNOWNCOMMAND
    pub fn unknown_command(nick: &str, command: &str) -> Message {
        Self::ErrUnknownCommand.reply(
            nick,
            vec![command.to_string(), "Unknown command".to_string()],
        )
    }

    /// ERR_NOMOTD
    pub fn no_motd(nick: &str) -> Message {
        Self::ErrNoMotd.reply(nick, vec!["MOTD File is missing".to_string()])
    }

    /// ERR_NONICKNAMEGIVEN
    pub fn no_nickname_given(nick: &str) -> Message {
        Self::ErrNoNicknameGiven.reply(nick, vec!["No nickname given".to_string()])
    }

    /// ERR_ERRONEUSNICKNAME
    pub fn erroneous_nickname(nick: &str, attempted: &str) -> Message {
        Self::ErrErroneousNickname.reply(
            nick,
            vec![attempted.to_string(), "Erroneous nickname".to_string()],
        )
    }

    /// ERR_NICKNAMEINUSE
    pub fn nickname_in_use(nick: &str, attempted: &str) -> Message {
        Self::ErrNicknameInUse.reply(
            nick,
            vec![attempted.to_string(), "Nickname is already in use".to_string()],
        )
    }

    /// ERR_USERNOTINCHANNEL
    pub fn user_not_in_channel(nick: &str, target: &str, channel: &str) -> Message {
        Self::ErrUserNotInChannel.reply(
            nick,
            vec![
                target.to_string(),
                channel.to_string(),
                "They aren't on that channel".to_string(),
            ],
        )
    }

    /// ERR_NOTONCHANNEL
    pub fn not_on_channel(nick: &str, channel: &str) -> Message {
        Self::ErrNotOnChannel.reply(
            nick,
            vec![channel.to_string(), "You're not on that channel".to_string()],
        )
    }

    /// ERR_USERONCHANNEL
    pub fn user_on_channel(nick: &str, target: &str, channel: &str) -> Message {
        Self::ErrUserOnChannel.reply(
            nick,
            vec![
                target.to_string(),
                channel.to_string(),
                "is already on channel".to_string(),
            ],
        )
    }

    /// ERR_NOTREGISTERED
    pub fn not_registered(nick: &str) -> Message {
        Self::ErrNotRegistered.reply(nick, vec!["You have not registered".to_string()])
    }

    /// ERR_NEEDMOREPARAMS
    pub fn need_more_params(nick: &str, command: &str) -> Message {
        Self::ErrNeedMoreParams.reply(
            nick,
            vec![command.to_string(), "Not enough parameters".to_string()],
        )
    }

    /// ERR_ALREADYREGISTRED
    pub fn already_registered(nick: &str) -> Message {
        Self::ErrAlreadyRegistered.reply(
            nick,
            vec!["Unauthorized command (already registered)".to_string()],
        )
    }

    /// ERR_CHANNELISFULL
    pub fn channel_is_full(nick: &str, channel: &str) -> Message {
        Self::ErrChannelIsFull.reply(
            nick,
            vec![channel.to_string(), "Cannot join channel (+l)".to_string()],
        )
    }

    /// ERR_UNKNOWNMODE
    pub fn unknown_mode(nick: &str, mode: char) -> Message {
        Self::ErrUnknownMode.reply(
            nick,
            vec![mode.to_string(), "is unknown mode char to me".to_string()],
        )
    }

    /// ERR_INVITEONLYCHAN
    pub fn invite_only_chan(nick: &str, channel: &str) -> Message {
        Self::ErrInviteOnlyChan.reply(
            nick,
            vec![channel.to_string(), "Cannot join channel (+i)".to_string()],
        )
    }

    /// ERR_BADCHANNELKEY
    pub fn bad_channel_key(nick: &str, channel: &str) -> Message {
        Self::ErrBadChannelKey.reply(
            nick,
            vec![channel.to_string(), "Cannot join channel (+k)".to_string()],
        )
    }

    /// ERR_BADCHANNAME
    pub fn bad_chan_name(nick: &str, channel: &str) -> Message {
        Self::ErrBadChanName.reply(
            nick,
            vec![channel.to_string(), "Illegal channel name".to_string()],
        )
    }

    /// ERR_CHANOPRIVSNEEDED
    pub fn chanop_privs_needed(nick: &str, channel: &str) -> Message {
        Self::ErrChanOpPrivsNeeded.reply(
            nick,
            vec![channel.to_string(), "You're not channel operator".to_string()],
        )
    }

    /// ERR_USERSDONTMATCH
    pub fn users_dont_match(nick: &str) -> Message {
        Self::ErrUsersDontMatch.reply(
            nick,
            vec!["Cannot change mode for other users".to_string()],
        )
    }
}
