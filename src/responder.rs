use super::*;

pub(super) const AUDIO_FAILED_NOTICE: &str = "🎧 Ses dosyası gönderilemedi.";

#[derive(Debug, Clone, PartialEq)]
pub(super) struct AudioClip {
    pub(super) key: String,
    pub(super) url: Url,
}

/// What to send back for a fired trigger.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ReplyPlan {
    Photo {
        image: Url,
        caption: Option<String>,
        audio: Option<AudioClip>,
    },
    Audio {
        clip: AudioClip,
        caption: Option<String>,
    },
    Text(String),
    Nothing,
}

/// Returns the trigger whose phrase occurs earliest in `text`. Triggers that
/// start at the same index resolve to the one defined first.
pub(super) fn find_trigger<'a>(triggers: &'a [Trigger], text: &str) -> Option<&'a Trigger> {
    let haystack = text.to_lowercase();
    if haystack.trim().is_empty() {
        return None;
    }
    triggers
        .iter()
        .filter_map(|trigger| haystack.find(&trigger.phrase).map(|pos| (pos, trigger)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, trigger)| trigger)
}

pub(super) fn resolve_text<R: Rng + ?Sized>(response: &Response, rng: &mut R) -> Option<String> {
    match &response.text {
        Some(ReplyText::Fixed(text)) => Some(text.clone()),
        Some(ReplyText::Variants(variants)) => variants.choose(rng).cloned(),
        None => None,
    }
}

pub(super) fn plan_reply(response: &Response, text: Option<String>, config: &Config) -> ReplyPlan {
    let image = response
        .image
        .as_ref()
        .and_then(|key| config.images.get(key))
        .cloned();
    let audio = response.audio.as_ref().and_then(|key| {
        config.audio.get(key).map(|url| AudioClip {
            key: key.clone(),
            url: url.clone(),
        })
    });

    match (image, audio, text) {
        (Some(image), audio, caption) => ReplyPlan::Photo {
            image,
            caption,
            audio,
        },
        (None, Some(clip), caption) => ReplyPlan::Audio { clip, caption },
        (None, None, Some(text)) => ReplyPlan::Text(text),
        (None, None, None) => ReplyPlan::Nothing,
    }
}

/// Media failures are logged and swallowed here; only a failed plain text send
/// reaches the caller.
pub(super) async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    http: &reqwest::Client,
    plan: ReplyPlan,
) -> Result<()> {
    match plan {
        ReplyPlan::Nothing => {}
        ReplyPlan::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        ReplyPlan::Photo {
            image,
            caption,
            audio,
        } => {
            let mut request = bot.send_photo(chat_id, InputFile::url(image.clone()));
            if let Some(caption) = caption.clone() {
                request = request.caption(caption);
            }
            let photo_sent = match request.await {
                Ok(_) => true,
                Err(err) => {
                    warn!("sending photo {} failed: {}", image, err);
                    false
                }
            };
            let clip_sent = match &audio {
                Some(clip) => send_clip(bot, chat_id, http, clip, caption.as_deref()).await?,
                None => false,
            };
            if !photo_sent && !clip_sent {
                if let Some(text) = caption {
                    bot.send_message(chat_id, text).await?;
                }
            }
        }
        ReplyPlan::Audio { clip, caption } => {
            let clip_sent = send_clip(bot, chat_id, http, &clip, caption.as_deref()).await?;
            if !clip_sent {
                if let Some(text) = caption {
                    bot.send_message(chat_id, text).await?;
                }
            }
        }
    }
    Ok(())
}

/// Fetches and sends one voice clip. `Ok(false)` means it was skipped and the
/// user has been told.
async fn send_clip(
    bot: &Bot,
    chat_id: ChatId,
    http: &reqwest::Client,
    clip: &AudioClip,
    caption: Option<&str>,
) -> Result<bool> {
    let bytes = match fetch_media(http, &clip.url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("fetching audio {:?} failed: {:#}", clip.key, err);
            bot.send_message(chat_id, AUDIO_FAILED_NOTICE).await?;
            return Ok(false);
        }
    };

    let file = InputFile::memory(bytes).file_name(format!("{}.ogg", clip.key));
    let mut request = bot.send_voice(chat_id, file);
    if let Some(caption) = caption {
        request = request.caption(caption);
    }
    match request.await {
        Ok(_) => Ok(true),
        Err(err) => {
            warn!("sending audio {:?} failed: {}", clip.key, err);
            bot.send_message(chat_id, AUDIO_FAILED_NOTICE).await?;
            Ok(false)
        }
    }
}

pub(super) async fn fetch_media(http: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    let resp = http
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {} failed", url))?;
    let bytes = resp.bytes().await.context("read media body")?;
    Ok(bytes.to_vec())
}
