use std::time::Duration;

use bingohall::prelude::*;

const PLAYERS: [&str; 3] = ["ada", "grace", "linus"];

// ---------------------------------------------------------------------------
// Game driver
// ---------------------------------------------------------------------------

/// Plays one room to completion: the first player creates it, everyone
/// joins, and the creator calls numbers until somebody's claim holds.
///
/// Returns the winner and how many numbers it took.
async fn play_one_game(hall: &Dispatcher<JsonCodec>) -> Result<(Handle, usize), BingoHallError> {
    let players: Vec<Handle> = PLAYERS
        .iter()
        .map(|name| Handle::new(*name))
        .collect::<Result<_, _>>()?;
    let caller = players[0].clone();

    // Room creation goes over the wire to show the JSON shape.
    let create = serde_json::json!({
        "type": "create_room",
        "name": "Demo hall",
        "max_players": players.len(),
        "handle": caller.as_str(),
    });
    let reply = hall.handle_bytes(create.to_string().as_bytes()).await?;
    tracing::info!(reply = %String::from_utf8_lossy(&reply), "create_room");
    let room_id = match JsonCodec.decode::<Response>(&reply)? {
        Response::RoomCreated { room_id } => room_id,
        other => return Err(unexpected(other)),
    };

    let mut updates = hall.registry().subscribe(&room_id).await?;
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if let Some(call) = &snapshot.latest_call {
                tracing::debug!(letter = %call.letter, number = call.number, "board updated");
            }
        }
    });

    for player in &players[1..] {
        expect_ok(
            hall.handle(Request::JoinRoom {
                room_id: room_id.clone(),
                handle: player.clone(),
            })
            .await,
        )?;
    }
    expect_ok(
        hall.handle(Request::StartGame {
            room_id: room_id.clone(),
            handle: caller.clone(),
        })
        .await,
    )?;

    let mut calls = 0;
    let winner = 'game: loop {
        let response = hall
            .handle(Request::CallNumber {
                room_id: room_id.clone(),
                handle: caller.clone(),
            })
            .await;
        match response {
            Response::NumberCalled { letter, number, .. } => {
                calls += 1;
                tracing::info!("{letter}-{number}");
            }
            Response::Error(ErrorBody {
                remaining_secs: Some(wait),
                ..
            }) => {
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }
            other => return Err(unexpected(other)),
        }

        for player in &players {
            let response = hall
                .handle(Request::CheckBingo {
                    room_id: room_id.clone(),
                    handle: player.clone(),
                })
                .await;
            if let Response::BingoChecked {
                has_bingo: true, ..
            } = expect_ok(response)?
            {
                break 'game player.clone();
            }
        }
    };

    hall.registry().remove_room(&room_id).await?;
    let _ = watcher.await;
    Ok((winner, calls))
}

fn expect_ok(response: Response) -> Result<Response, BingoHallError> {
    match response {
        Response::Error(body) => Err(unexpected(Response::Error(body))),
        ok => Ok(ok),
    }
}

fn unexpected(response: Response) -> BingoHallError {
    bingohall::protocol::ProtocolError::InvalidValue(format!("unexpected response: {response:?}"))
        .into()
}

/// The call cooldown in whole milliseconds, saturating at `u64::MAX`.
fn cooldown_millis(config: &HallConfig) -> u64 {
    u64::try_from(config.room.call_cooldown.as_millis()).unwrap_or(u64::MAX)
}

#[tokio::main]
async fn main() -> Result<(), BingoHallError> {
    bingohall::logging::init();

    let config = HallConfig::from_env()?;
    tracing::info!(
        cooldown_ms = cooldown_millis(&config),
        "starting autocaller"
    );
    let hall = Dispatcher::from_config(&config, JsonCodec);

    let (winner, calls) = play_one_game(&hall).await?;
    tracing::info!(%winner, calls, "bingo!");

    for row in hall.registry().leaderboard(config.leaderboard_limit) {
        tracing::info!(
            handle = %row.handle,
            score = row.total_score,
            bingos = row.total_bingos,
            games = row.games_played,
            "leaderboard"
        );
    }

    hall.registry().shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_demo_game_finishes_with_default_cooldown() {
        let hall = Dispatcher::from_config(&HallConfig::default(), JsonCodec);
        let (winner, calls) = play_one_game(&hall).await.unwrap();

        assert!(PLAYERS.contains(&winner.as_str()));
        // A line needs at least four numbers besides the free cell.
        assert!((4..=75).contains(&calls));

        let stats = hall.registry().player_stats(&winner).unwrap();
        assert_eq!(stats.total_bingos, 1);
        assert_eq!(hall.registry().room_count().await, 0);
    }

    #[test]
    fn test_cooldown_millis_saturates() {
        let mut config = HallConfig::default();
        assert_eq!(cooldown_millis(&config), 5_000);

        config.room.call_cooldown = Duration::MAX;
        assert_eq!(cooldown_millis(&config), u64::MAX);
    }
}
