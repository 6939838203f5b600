use super::*;

const HELP_TEXT: &str = "Komutlar:\n\
/save <yazı> - kaydet\n\
/kitaplar veya /list - kayıtları listele\n\
/find <kelime> - kayıtlarda ara\n\
/delete <no> [no...] - kayıt sil\n\
/edit <no> <yazı> - kaydı düzenle\n\
/export - kayıtları dosya olarak indir";
pub(super) const WRITE_FAILED: &str = "⚠️ Kayıt yazılamadı, lütfen tekrar dene.";

pub(super) async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let text = match msg.text() {
        Some(text) => text.to_string(),
        None => return Ok(()),
    };

    if let Some(cmd) = parse_command(&text) {
        if !cmd.is_for(&state.bot_username) {
            debug!("ignoring /{} addressed to another bot", cmd.name);
            return Ok(());
        }
        let rest = command_rest(&text);
        match cmd.name.as_str() {
            "start" | "help" => {
                bot.send_message(msg.chat.id, HELP_TEXT).await?;
            }
            name => match ListCommand::parse(name, rest) {
                Some(command) => handle_list_command(&bot, msg.chat.id, &state, command).await?,
                None => debug!("ignoring unknown command /{}", name),
            },
        }
        return Ok(());
    }

    info!(
        "message in chat {}: {}",
        msg.chat.id.0,
        preview_for_log(&text)
    );
    handle_trigger_text(&bot, msg.chat.id, &state, &text).await
}

pub(super) async fn handle_list_command(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<AppState>,
    command: ListCommand,
) -> Result<()> {
    if let Some(hint) = command.usage_hint() {
        bot.send_message(chat_id, hint).await?;
        return Ok(());
    }

    let outcome = if command.is_mutating() {
        let _guard = state.write_lock.lock().await;
        let mut entries = state.store.load().await;
        let outcome = apply_command(&mut entries, &command)?;
        if let CommandOutcome::Changed(_) = &outcome {
            if let Err(err) = state.store.save(&entries).await {
                error!("saving entries after {:?} failed: {:#}", command, err);
                bot.send_message(chat_id, WRITE_FAILED).await?;
                return Ok(());
            }
            info!("entries updated by {:?}, {} stored", command, entries.len());
        }
        outcome
    } else {
        let mut entries = state.store.load().await;
        apply_command(&mut entries, &command)?
    };

    match outcome {
        CommandOutcome::Reply(text) | CommandOutcome::Changed(text) => {
            for chunk in chunk_message(&text, TELEGRAM_MAX_MESSAGE_LEN) {
                bot.send_message(chat_id, chunk).await?;
            }
        }
        CommandOutcome::Document { bytes, caption } => {
            let file = InputFile::memory(bytes).file_name(EXPORT_FILENAME);
            bot.send_document(chat_id, file).caption(caption).await?;
        }
    }
    Ok(())
}

async fn handle_trigger_text(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<AppState>,
    text: &str,
) -> Result<()> {
    let Some(trigger) = find_trigger(&state.config.triggers, text) else {
        return Ok(());
    };
    info!("trigger {:?} fired in chat {}", trigger.phrase, chat_id.0);

    let reply_text = {
        let mut rng = state.rng.lock().await;
        resolve_text(&trigger.response, &mut *rng)
    };
    let plan = plan_reply(&trigger.response, reply_text, &state.config);
    send_reply(bot, chat_id, &state.http, plan).await
}
