mod options;

use std::process::exit;

pub use options::ServerOptions;

use crate::battlefield::gamerecord::GameRecord;
use crate::battlefield::prelude::*;
use crate::battlefield::record;
use crate::utils::prelude::*;

/// A line-oriented command server fronting one `Board` instance, modelled
/// directly on the teacher's `LTPServer`: one command per line, dispatched
/// on the first whitespace-delimited token, every response terminated by an
/// `ok`/`err` footer.
pub struct Server {
    board: Option<Board>,
    config: ServerOptions,
}

impl Server {
    pub fn new(options: ServerOptions) -> Server {
        Server { board: None, config: options }
    }

    /// Runs the server's read-eval-print loop against stdin/stdout.
    pub fn run(&mut self) -> Result<()> {
        if let Some(path) = self.config.document.clone() {
            self.load_document(&path)?;
        }

        loop {
            let mut cmdstr = String::new();
            if std::io::stdin().read_line(&mut cmdstr)? == 0 {
                return Ok(());
            }

            let args: Vec<&str> = cmdstr.split_whitespace().filter(|s| !s.is_empty()).collect();
            let cmd = *args.first().unwrap_or(&"");

            self.apply(cmd, &args[1..])?;
        }
    }

    fn apply(&mut self, cmd: &str, args: &[&str]) -> Result<()> {
        let result = match cmd {
            "" => Ok(()),
            "init" | "new_game" => self.new_game(args),
            "position" => self.position(args),
            "move" => self.do_move(args),
            "attack" => self.attack(args),
            "pass" => self.pass(),
            "end_turn" => self.end_turn(),
            "phase" => self.phase(args),
            "surrender" => self.surrender(args),
            "undo" => self.undo(args),
            "redo" => self.redo(args),
            "set_undo_limit" => self.set_undo_limit(args),
            "status" => self.status(),
            "network" => self.network(args),
            "victory" => self.victory(),
            "retreats" => self.retreats(),
            "info" => self.info(),
            "quit" => exit(0),
            _ => Err(anyhow!("unrecognized command {cmd}")),
        };

        match result {
            Ok(_) => {
                log::debug!("command completed successfully: {cmd} {}", args.join(" "));
                self.ok()
            }
            Err(err) => {
                log::warn!("encountered recoverable error:\n{err}");
                self.err(&err)
            }
        }
    }

    fn new_game(&mut self, args: &[&str]) -> Result<()> {
        if args.first() == Some(&"document") {
            let path = args.get(1).ok_or_else(|| anyhow!("missing document path"))?;
            self.load_document(path)?;
        } else {
            let mut board = crate::battlefield::setup::default_setup();
            board.set_undo_limit(self.config.undo_limit);
            self.board = Some(board);
        }
        println!("{}", record::encode(self.get()?));
        Ok(())
    }

    fn position(&mut self, args: &[&str]) -> Result<()> {
        match args.first() {
            Some(&"startpos") => {
                self.board = Some(crate::battlefield::setup::default_setup());
            }
            Some(&"document") => {
                let path = args.get(1).ok_or_else(|| anyhow!("missing document path"))?;
                self.load_document(path)?;
            }
            _ => return Err(anyhow!("expected 'startpos' or 'document <path>'")),
        }

        if let Some(idx) = args.iter().position(|a| *a == "moves") {
            for pair in args[idx + 1..].chunks(2) {
                if pair.len() != 2 {
                    return Err(anyhow!("dangling move in move list"));
                }
                let from = pair[0].parse::<Coord>().context("bad from-square")?;
                let to = pair[1].parse::<Coord>().context("bad to-square")?;
                self.get_mut()?.execute_move(from, to)?;
            }
        }

        println!("{}", record::encode(self.get()?));
        Ok(())
    }

    fn do_move(&mut self, args: &[&str]) -> Result<()> {
        if args.len() != 2 {
            return Err(anyhow!("usage: move <from> <to>"));
        }
        let from = args[0].parse::<Coord>().context("bad from-square")?;
        let to = args[1].parse::<Coord>().context("bad to-square")?;
        let (_, destroyed_arsenal) = self.get_mut()?.execute_move(from, to)?;
        println!("{} arsenal_destroyed={}", record::encode_board_only(self.get()?), destroyed_arsenal);
        Ok(())
    }

    fn attack(&mut self, args: &[&str]) -> Result<()> {
        let target = args.first().ok_or_else(|| anyhow!("usage: attack <target>"))?.parse::<Coord>()?;
        self.get_mut()?.execute_attack(target)?;
        println!("{}", record::encode_board_only(self.get()?));
        Ok(())
    }

    fn pass(&mut self) -> Result<()> {
        self.get_mut()?.pass_attack()?;
        println!("{}", record::encode_board_only(self.get()?));
        Ok(())
    }

    fn end_turn(&mut self) -> Result<()> {
        let captured = self.get_mut()?.end_turn()?;
        let labels: Vec<String> = captured.iter().map(Coord::label).collect();
        println!("[{}]", labels.join(","));
        Ok(())
    }

    fn phase(&mut self, args: &[&str]) -> Result<()> {
        match args.first() {
            Some(&"movement") => {} // Battle -> Movement only happens via end_turn.
            Some(&"battle") => self.get_mut()?.switch_to_battle()?,
            _ => return Err(anyhow!("expected 'movement' or 'battle'")),
        }
        println!("{}", self.get()?.phase().label());
        Ok(())
    }

    fn surrender(&mut self, args: &[&str]) -> Result<()> {
        let player = parse_player(args.first().copied())?;
        self.get_mut()?.surrender(player)?;
        println!("{:?}", self.get()?.result());
        Ok(())
    }

    fn undo(&mut self, args: &[&str]) -> Result<()> {
        let count = parse_count(args)?;
        for _ in 0..count {
            self.get_mut()?.undo()?;
        }
        println!("{}", record::encode_board_only(self.get()?));
        Ok(())
    }

    fn redo(&mut self, args: &[&str]) -> Result<()> {
        let count = parse_count(args)?;
        for _ in 0..count {
            self.get_mut()?.redo()?;
        }
        println!("{}", record::encode_board_only(self.get()?));
        Ok(())
    }

    fn set_undo_limit(&mut self, args: &[&str]) -> Result<()> {
        let limit = args.first().ok_or_else(|| anyhow!("usage: set_undo_limit <n>"))?.parse::<usize>()?;
        self.get_mut()?.set_undo_limit(Some(limit));
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let board = self.get()?;
        println!(
            "turn={} player={} phase={} result={:?}",
            board.turn_number(),
            board.current_player(),
            board.phase().label(),
            board.result()
        );
        Ok(())
    }

    fn network(&mut self, args: &[&str]) -> Result<()> {
        let player = parse_player(args.first().copied())?;
        let board = self.get_mut()?;
        let online = board.online_squares(player);
        let labels: Vec<String> = online.iter().map(Coord::label).collect();
        println!("[{}]", labels.join(","));
        Ok(())
    }

    fn victory(&mut self) -> Result<()> {
        println!("{:?}", self.get()?.result());
        Ok(())
    }

    fn retreats(&mut self) -> Result<()> {
        let board = self.get()?;
        let pending: Vec<String> = board.must_retreat().iter().map(Coord::label).collect();
        let active: Vec<String> = board.retreating_now().iter().map(Coord::label).collect();
        println!("pending=[{}] active=[{}]", pending.join(","), active.join(","));
        Ok(())
    }

    fn info(&self) -> Result<()> {
        println!("id {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        Ok(())
    }

    fn load_document(&mut self, path: &str) -> Result<()> {
        let contents = std::fs::read_to_string(path).with_context(|| format!("reading document {path}"))?;
        let record: GameRecord = serde_json::from_str(&contents).with_context(|| format!("parsing document {path}"))?;
        let mut board = record.load()?;
        board.set_undo_limit(self.config.undo_limit);
        self.board = Some(board);
        Ok(())
    }

    fn get(&self) -> Result<&Board> {
        self.board.as_ref().ok_or(EngineError::NoGameInProgress).map_err(Error::from)
    }

    fn get_mut(&mut self) -> Result<&mut Board> {
        self.board.as_mut().ok_or(EngineError::NoGameInProgress).map_err(Error::from)
    }

    fn err(&self, err: &Error) -> Result<()> {
        println!("err\n{}", err);
        self.ok()
    }

    fn ok(&self) -> Result<()> {
        println!("ok");
        Ok(())
    }
}

fn parse_player(tok: Option<&str>) -> Result<Player> {
    match tok {
        Some("north") | Some("N") | Some("n") => Ok(Player::North),
        Some("south") | Some("S") | Some("s") => Ok(Player::South),
        other => Err(anyhow!("expected 'north' or 'south', got {other:?}")),
    }
}

fn parse_count(args: &[&str]) -> Result<usize> {
    match args.first() {
        Some(tok) => tok.parse::<usize>().context("bad count"),
        None => Ok(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Server {
        let mut server = Server::new(ServerOptions { log_level: None, undo_limit: None, document: None });
        server.new_game(&[]).unwrap();
        server
    }

    #[test]
    fn init_reports_turn_one_north_movement() {
        let mut server = fresh();
        server.status().unwrap();
        let board = server.get().unwrap();
        assert_eq!(board.turn_number(), 1);
        assert_eq!(board.current_player(), Player::North);
        assert_eq!(board.phase(), crate::battlefield::board::Phase::Movement);
    }

    #[test]
    fn attack_before_switching_to_battle_is_rejected_without_mutation() {
        let mut server = fresh();
        let before = record::encode(server.get().unwrap());
        let result = server.attack(&["13M"]);
        assert!(result.is_err());
        assert_eq!(record::encode(server.get().unwrap()), before);
    }

    #[test]
    fn undo_on_an_empty_stack_is_rejected() {
        let mut server = fresh();
        assert!(server.undo(&[]).is_err());
    }

    #[test]
    fn retreats_reports_both_pending_and_active_sets() {
        let mut server = fresh();
        assert!(server.retreats().is_ok());
    }

    #[test]
    fn commands_without_a_game_in_progress_report_no_game_in_progress() {
        let mut server = Server::new(ServerOptions { log_level: None, undo_limit: None, document: None });
        let err = server.status().unwrap_err();
        assert!(err.to_string().contains("no game in progress"));
    }
}
