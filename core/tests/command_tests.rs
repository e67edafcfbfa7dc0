//! Tests for IRC command handling

use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tinyircd_core::*;

fn server() -> Server {
    Server::new(Config::default())
}

fn connect(server: &mut Server) -> ClientId {
    server.add_client(SocketAddr::from(([127, 0, 0, 1], 40000)), "localhost".to_string())
}

fn register(server: &mut Server, nick: &str) -> ClientId {
    let id = connect(server);
    server.handle_line(id, &format!("NICK {}", nick));
    server.handle_line(id, &format!("USER {} 0 * :{} Real", nick, nick));
    server.take_output(id);
    id
}

fn register_at(server: &mut Server, nick: &str, now: Instant) -> ClientId {
    let id = server.add_client_at(SocketAddr::from(([127, 0, 0, 1], 40000)), "localhost".to_string(), now);
    server.handle_line_at(id, &format!("NICK {}", nick), now);
    server.handle_line_at(id, &format!("USER {} 0 * :{} Real", nick, nick), now);
    server.take_output(id);
    id
}

/// Numeric codes found in a batch of output lines
fn numerics(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| Message::parse(l.trim_end()).ok())
        .map(|m| m.command.to_string())
        .filter(|c| c.len() == 3 && c.bytes().all(|b| b.is_ascii_digit()))
        .collect()
}

fn has_numeric(lines: &[String], code: &str) -> bool {
    numerics(lines).iter().any(|c| c == code)
}

#[test]
fn test_distinct_nicks_register_together() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");

    assert!(server.client(alice).unwrap().is_registered());
    assert!(server.client(bob).unwrap().is_registered());
    assert_eq!(server.find_nick("ALICE"), Some(alice));
    assert_eq!(server.find_nick("Bob"), Some(bob));
}

#[test]
fn test_nick_in_use_is_case_insensitive() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let other = connect(&mut server);

    server.handle_line(other, "NICK ALICE");
    let output = server.take_output(other);
    assert_eq!(numerics(&output), vec!["433"]);
    assert!(output[0].contains("ALICE :Nickname is already in use"));

    assert_eq!(server.client(other).unwrap().nick(), "*");
    assert_eq!(server.client(other).unwrap().state, ClientState::Anon);
    assert_eq!(server.client(alice).unwrap().nick(), "alice");
    assert_eq!(server.find_nick("alice"), Some(alice));
}

#[test]
fn test_nick_change_is_seen_by_channel_peers() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(alice, "NICK Alicia");

    let expected = ":alice!alice@localhost NICK Alicia\r\n";
    assert_eq!(server.take_output(alice), vec![expected]);
    assert_eq!(server.take_output(bob), vec![expected]);
    assert!(server.find_nick("alice").is_none());
    assert_eq!(server.find_nick("alicia"), Some(alice));
}

#[test]
fn test_nick_validation_errors() {
    let mut server = server();
    let id = connect(&mut server);

    server.handle_line(id, "NICK");
    assert_eq!(numerics(&server.take_output(id)), vec!["431"]);

    server.handle_line(id, "NICK 9lives");
    assert_eq!(numerics(&server.take_output(id)), vec!["432"]);

    server.handle_line(id, "NICK waytoolongnickname123");
    assert_eq!(numerics(&server.take_output(id)), vec!["432"]);
}

#[test]
fn test_user_then_nick_registers() {
    let mut server = server();
    let id = connect(&mut server);

    server.handle_line(id, "USER carol 0 * :Carol C");
    assert_eq!(server.client(id).unwrap().state, ClientState::UserSet);
    assert!(server.take_output(id).is_empty());

    server.handle_line(id, "NICK carol");
    let output = server.take_output(id);
    assert_eq!(numerics(&output)[..5], ["001", "002", "003", "004", "005"]);
    assert!(server.client(id).unwrap().is_registered());
    assert_eq!(server.client(id).unwrap().realname, "Carol C");
}

#[test]
fn test_unregistered_commands_are_restricted() {
    let mut server = server();
    let id = connect(&mut server);

    server.handle_line(id, "JOIN #test");
    assert_eq!(numerics(&server.take_output(id)), vec!["451"]);
    assert!(server.channels.find("#test").is_none());

    server.handle_line(id, "FROBNICATE now");
    assert_eq!(numerics(&server.take_output(id)), vec!["421"]);

    server.handle_line(id, "PING :token123");
    assert_eq!(
        server.take_output(id),
        vec![":irc.localhost PONG irc.localhost token123\r\n"]
    );

    server.handle_line(id, "MOTD");
    assert_eq!(numerics(&server.take_output(id)), vec!["375", "372", "372", "376"]);
}

#[test]
fn test_user_errors() {
    let mut server = server();
    let id = connect(&mut server);

    server.handle_line(id, "USER onlyone");
    assert_eq!(numerics(&server.take_output(id)), vec!["461"]);
    assert!(!server.client(id).unwrap().has_user());

    server.handle_line(id, "USER a 0 * :A");
    server.handle_line(id, "USER b 0 * :B");
    assert_eq!(numerics(&server.take_output(id)), vec!["462"]);
    assert_eq!(server.client(id).unwrap().username(), "a");
}

#[test]
fn test_blank_lines_are_ignored() {
    let mut server = server();
    let id = connect(&mut server);
    server.handle_line(id, "");
    server.handle_line(id, "   ");
    assert!(server.take_output(id).is_empty());
    assert_eq!(server.client(id).unwrap().state, ClientState::Anon);
}

#[test]
fn test_join_part_destroys_channel() {
    let mut server = server();
    let alice = register(&mut server, "alice");

    server.handle_line(alice, "JOIN #solo");
    assert!(server.channels.find("#solo").is_some());
    server.handle_line(alice, "PART #solo :later");
    assert!(server.channels.find("#solo").is_none());
    assert!(server.client(alice).unwrap().channels.is_empty());

    let output = server.take_output(alice);
    assert_eq!(output.last().unwrap(), ":alice!alice@localhost PART #solo :later\r\n");
}

#[test]
fn test_part_errors() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");

    server.handle_line(bob, "PART #test");
    assert_eq!(numerics(&server.take_output(bob)), vec!["442"]);

    server.handle_line(bob, "PART #nowhere");
    assert_eq!(numerics(&server.take_output(bob)), vec!["403"]);

    server.handle_line(bob, "PART");
    assert_eq!(numerics(&server.take_output(bob)), vec!["461"]);
}

#[test]
fn test_membership_stays_consistent() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    let carol = register(&mut server, "carol");

    server.handle_line(alice, "JOIN #a,#b");
    server.handle_line(bob, "JOIN #a,#b");
    server.handle_line(carol, "JOIN #b");
    assert!(server.membership_consistent());

    server.handle_line(bob, "PART #a");
    assert!(server.membership_consistent());
    assert!(!server.channels.find("#a").unwrap().has_member(bob));

    server.handle_line(alice, "KICK #b carol :out");
    assert!(server.membership_consistent());
    assert!(!server.client(carol).unwrap().channels.contains("#b"));

    server.handle_line(bob, "QUIT :gone");
    assert!(server.membership_consistent());
    assert!(server.client(bob).is_none());
    assert_eq!(server.channels.find("#b").unwrap().member_count(), 1);
}

#[test]
fn test_join_rejects_bad_names() {
    let mut server = server();
    let alice = register(&mut server, "alice");

    server.handle_line(alice, "JOIN nohash,#ok");
    let output = server.take_output(alice);
    assert!(has_numeric(&output, "479"));
    assert!(server.channels.find("#ok").is_some());
    assert!(server.channels.find("nohash").is_none());
}

#[test]
fn test_join_zero_parts_everything() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #a,#b");
    server.handle_line(bob, "JOIN #a");
    server.take_output(bob);

    server.handle_line(alice, "JOIN 0");
    assert!(server.client(alice).unwrap().channels.is_empty());
    assert!(server.channels.find("#b").is_none());
    assert_eq!(server.take_output(bob), vec![":alice!alice@localhost PART #a\r\n"]);
}

#[test]
fn test_channel_limit_per_client() {
    let mut config = Config::default();
    config.server.max_channels_per_client = 2;
    let mut server = Server::new(config);
    let alice = register(&mut server, "alice");

    server.handle_line(alice, "JOIN #one,#two,#three");
    assert!(has_numeric(&server.take_output(alice), "405"));
    assert!(server.channels.find("#three").is_none());
}

#[test]
fn test_no_external_messages() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    let outsider = register(&mut server, "mallory");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(outsider, "PRIVMSG #test :let me in");
    assert_eq!(numerics(&server.take_output(outsider)), vec!["404"]);
    assert!(server.take_output(alice).is_empty());
    assert!(server.take_output(bob).is_empty());

    server.handle_line(alice, "MODE #test -n");
    server.take_output(alice);
    server.take_output(bob);
    server.handle_line(outsider, "PRIVMSG #test :now?");
    assert!(server.take_output(outsider).is_empty());
    assert_eq!(
        server.take_output(bob),
        vec![":mallory!mallory@localhost PRIVMSG #test :now?\r\n"]
    );
}

#[test]
fn test_moderated_channel() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.handle_line(alice, "MODE #test +m");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(bob, "PRIVMSG #test :hello?");
    assert_eq!(numerics(&server.take_output(bob)), vec!["404"]);
    assert!(server.take_output(alice).is_empty());

    server.handle_line(alice, "MODE #test +v bob");
    server.take_output(alice);
    server.take_output(bob);
    server.handle_line(bob, "PRIVMSG #test :hello!");
    assert_eq!(
        server.take_output(alice),
        vec![":bob!bob@localhost PRIVMSG #test :hello!\r\n"]
    );
}

#[test]
fn test_privmsg_errors_and_notice_silence() {
    let mut server = server();
    let alice = register(&mut server, "alice");

    server.handle_line(alice, "PRIVMSG");
    assert_eq!(numerics(&server.take_output(alice)), vec!["411"]);

    server.handle_line(alice, "PRIVMSG bob");
    assert_eq!(numerics(&server.take_output(alice)), vec!["412"]);

    server.handle_line(alice, "PRIVMSG ghost :boo");
    assert_eq!(numerics(&server.take_output(alice)), vec!["401"]);

    server.handle_line(alice, "NOTICE ghost :boo");
    server.handle_line(alice, "NOTICE");
    server.handle_line(alice, "NOTICE #nowhere :boo");
    assert!(server.take_output(alice).is_empty());
}

#[test]
fn test_private_message_and_away() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");

    server.handle_line(bob, "AWAY :lunch");
    assert_eq!(numerics(&server.take_output(bob)), vec!["306"]);

    server.handle_line(alice, "PRIVMSG Bob :you there?");
    assert_eq!(
        server.take_output(bob),
        vec![":alice!alice@localhost PRIVMSG Bob :you there?\r\n"]
    );
    let output = server.take_output(alice);
    assert_eq!(output, vec![":irc.localhost 301 alice bob :lunch\r\n"]);

    server.handle_line(bob, "AWAY");
    assert_eq!(numerics(&server.take_output(bob)), vec!["305"]);
    assert!(server.client(bob).unwrap().away.is_none());
}

#[test]
fn test_topic_rules() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(bob, "TOPIC #test");
    assert_eq!(numerics(&server.take_output(bob)), vec!["331"]);

    server.handle_line(bob, "TOPIC #test :bob was here");
    assert_eq!(numerics(&server.take_output(bob)), vec!["482"]);

    server.handle_line(alice, "TOPIC #test :Rust talk");
    let broadcast = ":alice!alice@localhost TOPIC #test :Rust talk\r\n";
    assert_eq!(server.take_output(alice), vec![broadcast]);
    assert_eq!(server.take_output(bob), vec![broadcast]);

    server.handle_line(bob, "TOPIC #test");
    let output = server.take_output(bob);
    assert_eq!(numerics(&output), vec!["332", "333"]);
    assert!(output[0].ends_with("332 bob #test :Rust talk\r\n"));
    assert!(output[1].contains("alice!alice@localhost"));

    server.handle_line(alice, "MODE #test -t");
    server.handle_line(bob, "TOPIC #test :open now");
    assert_eq!(
        server.channels.find("#test").unwrap().topic.as_ref().unwrap().text,
        "open now"
    );
}

#[test]
fn test_topic_is_truncated() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(alice, &format!("TOPIC #test :{}", "x".repeat(400)));
    let topic = server.channels.find("#test").unwrap().topic.clone().unwrap();
    assert_eq!(topic.text.len(), 300);
}

#[test]
fn test_channel_mode_query_and_changes() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(bob, "MODE #test");
    let output = server.take_output(bob);
    assert_eq!(numerics(&output), vec!["324", "329"]);
    assert!(output[0].contains("324 bob #test :+nt"));

    server.handle_line(bob, "MODE #test +m");
    assert_eq!(numerics(&server.take_output(bob)), vec!["482"]);

    server.handle_line(alice, "MODE #test +o bob");
    let broadcast = ":alice!alice@localhost MODE #test +o bob\r\n";
    assert_eq!(server.take_output(alice), vec![broadcast]);
    assert_eq!(server.take_output(bob), vec![broadcast]);
    assert!(server.channels.find("#test").unwrap().is_operator(bob));

    server.handle_line(bob, "MODE #test +x");
    assert_eq!(numerics(&server.take_output(bob)), vec!["472"]);

    server.handle_line(alice, "MODE #test +v ghost");
    assert_eq!(numerics(&server.take_output(alice)), vec!["401"]);
}

#[test]
fn test_mode_broadcast_lists_applied_changes() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.handle_line(alice, "MODE #test +m");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(alice, "MODE #test +o-m bob");
    let broadcast = ":alice!alice@localhost MODE #test +o-m bob\r\n";
    assert_eq!(server.take_output(alice), vec![broadcast]);
    assert_eq!(server.take_output(bob), vec![broadcast]);

    server.handle_line(alice, "MODE #test +v-t ghost");
    assert_eq!(
        server.take_output(alice),
        vec![
            ":irc.localhost 401 alice ghost :No such nick/channel\r\n",
            ":alice!alice@localhost MODE #test -t\r\n",
        ]
    );
    assert_eq!(
        server.take_output(bob),
        vec![":alice!alice@localhost MODE #test -t\r\n"]
    );

    server.handle_line(alice, "MODE #test +o");
    assert!(server.take_output(alice).is_empty());
    assert!(server.take_output(bob).is_empty());
}

#[test]
fn test_member_mode_for_non_member() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.take_output(alice);

    server.handle_line(alice, "MODE #test +o bob");
    assert_eq!(numerics(&server.take_output(alice)), vec!["441"]);
}

#[test]
fn test_ban_list() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(alice, "MODE #test +b *!*@bad.example");
    server.take_output(alice);

    server.handle_line(alice, "MODE #test b");
    let output = server.take_output(alice);
    assert_eq!(numerics(&output), vec!["367", "368"]);
    assert!(output[0].ends_with("367 alice #test :*!*@bad.example\r\n"));
}

#[test]
fn test_key_limit_and_invite_only() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    let carol = register(&mut server, "carol");
    server.handle_line(alice, "JOIN #test");

    server.handle_line(alice, "MODE #test +k sesame");
    server.handle_line(bob, "JOIN #test");
    assert_eq!(numerics(&server.take_output(bob)), vec!["475"]);
    server.handle_line(bob, "JOIN #test sesame");
    assert!(server.channels.find("#test").unwrap().has_member(bob));

    server.handle_line(alice, "MODE #test -k sesame");
    server.handle_line(alice, "MODE #test +l 2");
    server.handle_line(carol, "JOIN #test");
    assert_eq!(numerics(&server.take_output(carol)), vec!["471"]);

    server.handle_line(alice, "MODE #test -l+i");
    server.handle_line(carol, "JOIN #test");
    assert_eq!(numerics(&server.take_output(carol)), vec!["473"]);

    server.take_output(alice);
    server.handle_line(alice, "INVITE carol #test");
    assert_eq!(numerics(&server.take_output(alice)), vec!["341"]);
    assert_eq!(
        server.take_output(carol),
        vec![":alice!alice@localhost INVITE carol #test\r\n"]
    );
    server.handle_line(carol, "JOIN #test");
    assert!(server.channels.find("#test").unwrap().has_member(carol));
}

#[test]
fn test_invite_errors() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(alice, "INVITE bob #test");
    assert_eq!(numerics(&server.take_output(alice)), vec!["443"]);

    server.handle_line(alice, "INVITE ghost #test");
    assert_eq!(numerics(&server.take_output(alice)), vec!["401"]);

    let carol = register(&mut server, "carol");
    server.handle_line(carol, "INVITE alice #test");
    assert_eq!(numerics(&server.take_output(carol)), vec!["442"]);
}

#[test]
fn test_kick_requires_operator() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(bob);

    server.handle_line(bob, "KICK #test alice");
    assert_eq!(numerics(&server.take_output(bob)), vec!["482"]);
    assert!(server.channels.find("#test").unwrap().has_member(alice));

    server.handle_line(alice, "KICK #test ghost");
    assert!(has_numeric(&server.take_output(alice), "401"));
}

#[test]
fn test_quit_reason_defaults_to_nick() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(bob, "JOIN #test");
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line(bob, "QUIT");
    assert_eq!(
        server.take_output(alice),
        vec![":bob!bob@localhost QUIT :bob\r\n"]
    );
    assert_eq!(
        server.take_output(bob),
        vec!["ERROR :Closing Link: localhost (bob)\r\n"]
    );
}

#[test]
fn test_ping_timeout_sends_one_quit_per_peer() {
    let mut server = server();
    let start = Instant::now();
    let alice = register_at(&mut server, "alice", start);
    let bob = register_at(&mut server, "bob", start);

    for channel in ["#a", "#b", "#c"] {
        server.handle_line_at(alice, &format!("JOIN {}", channel), start);
        server.handle_line_at(bob, &format!("JOIN {}", channel), start);
    }
    server.take_output(alice);
    server.take_output(bob);

    server.handle_line_at(bob, "PONG :irc.localhost", start + Duration::from_secs(100));
    server.liveness_sweep(start + Duration::from_secs(121));

    assert!(server.client(alice).is_none());
    assert!(server.find_nick("alice").is_none());
    for channel in ["#a", "#b", "#c"] {
        let channel = server.channels.find(channel).unwrap();
        assert!(!channel.has_member(alice));
        assert!(channel.has_member(bob));
    }
    assert!(server.membership_consistent());

    let output = server.take_output(bob);
    assert_eq!(
        output,
        vec![":alice!alice@localhost QUIT :Ping timeout: 120 seconds\r\n"]
    );
}

#[test]
fn test_whois() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.handle_line(alice, "AWAY :busy");
    server.take_output(alice);

    server.handle_line(bob, "WHOIS alice");
    let output = server.take_output(bob);
    assert_eq!(numerics(&output), vec!["311", "319", "312", "301", "317", "318"]);
    assert!(output[0].contains("311 bob alice alice localhost * :alice Real"));
    assert!(output[1].contains("319 bob alice :@#test"));

    server.handle_line(bob, "WHOIS ghost");
    assert_eq!(numerics(&server.take_output(bob)), vec!["401", "318"]);
}

#[test]
fn test_secret_channels_are_hidden() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #open,#hidden");
    server.handle_line(alice, "MODE #hidden +s");
    server.take_output(alice);

    server.handle_line(bob, "LIST");
    let output = server.take_output(bob);
    assert_eq!(numerics(&output), vec!["321", "322", "323"]);
    assert!(output[1].contains("#open"));

    server.handle_line(bob, "WHOIS alice");
    let output = server.take_output(bob);
    assert!(output.iter().any(|l| l.contains("319 bob alice :@#open\r\n")));

    server.handle_line(bob, "NAMES #hidden");
    assert_eq!(numerics(&server.take_output(bob)), vec!["366"]);
}

#[test]
fn test_who_ison_userhost() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    let bob = register(&mut server, "bob");
    server.handle_line(alice, "JOIN #test");
    server.take_output(alice);

    server.handle_line(bob, "WHO #test");
    let output = server.take_output(bob);
    assert_eq!(numerics(&output), vec!["352", "315"]);
    assert!(output[0].contains("352 bob #test alice localhost irc.localhost alice H@ :0 alice Real"));

    server.handle_line(bob, "ISON alice ghost BOB");
    assert_eq!(
        server.take_output(bob),
        vec![":irc.localhost 303 bob :alice bob\r\n"]
    );

    server.handle_line(bob, "USERHOST alice");
    assert_eq!(
        server.take_output(bob),
        vec![":irc.localhost 302 bob :alice=+alice@localhost\r\n"]
    );
}

#[test]
fn test_server_queries() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    connect(&mut server);
    server.handle_line(alice, "JOIN #test");
    server.take_output(alice);

    server.handle_line(alice, "LUSERS");
    let output = server.take_output(alice);
    assert_eq!(numerics(&output), vec!["251", "252", "253", "254", "255"]);
    assert!(output[0].contains("There are 1 users"));
    assert!(output[2].contains("253 alice 1 :unknown"));
    assert!(output[3].contains("254 alice 1 :channels"));

    server.handle_line(alice, "VERSION");
    assert_eq!(numerics(&server.take_output(alice)), vec!["351"]);

    server.handle_line(alice, "TIME");
    assert_eq!(numerics(&server.take_output(alice)), vec!["391"]);
}

#[test]
fn test_user_mode() {
    let mut server = server();
    let alice = register(&mut server, "alice");
    register(&mut server, "bob");

    server.handle_line(alice, "MODE alice");
    assert_eq!(
        server.take_output(alice),
        vec![":irc.localhost 221 alice :+\r\n"]
    );

    server.handle_line(alice, "MODE bob");
    assert_eq!(numerics(&server.take_output(alice)), vec!["502"]);
}
