use super::*;

const ASSET_BASE: &str = "https://raw.githubusercontent.com/gozdelicious/Telegram-Trigger-Botu/main";

pub(super) fn default_audio() -> HashMap<String, String> {
    [
        ("merhaba", "sesler/merhaba.ogg"),
        ("günaydın", "sesler/gunaydin.ogg"),
        ("zabaha", "sesler/zabaha-kadar.ogg"),
    ]
    .into_iter()
    .map(|(key, path)| (key.to_string(), format!("{}/{}", ASSET_BASE, path)))
    .collect()
}

pub(super) fn default_images() -> HashMap<String, String> {
    [("resim", "resimler/yardim.jpg")]
        .into_iter()
        .map(|(key, path)| (key.to_string(), format!("{}/{}", ASSET_BASE, path)))
        .collect()
}

pub(super) fn default_triggers() -> Vec<TriggerFile> {
    fn reply(phrase: &str, text: &str) -> TriggerFile {
        TriggerFile {
            phrase: phrase.to_string(),
            text: Some(text.to_string()),
            variants: None,
            audio: None,
            image: None,
        }
    }

    vec![
        reply(
            "merhaba",
            "👋 MERHABA! Ay heyecanlandım. İlk merhaba diyen ben olmalıyım. HER ZAMAN!",
        ),
        reply("günaydın", "🌅 Günaydın! Güzel bir gün olsun!"),
        reply("selam", "✨ Selam cnms! Hoş geldin!"),
        TriggerFile {
            image: Some("resim".to_string()),
            ..reply("imdat", "AY NOLUYO NOLUYOOO 😱😱😱")
        },
        TriggerFile {
            audio: Some("zabaha".to_string()),
            ..reply("zabah", "NEREYE? ZABAĞA GADAR BURDAYIZ BUGÜN!")
        },
        reply("iyi geceler", "NEREYE? ZABAĞA GADAR BURDAYIZ BUGÜN!"),
        reply("seks", "Şşşş,🤫🤫 bunu MZ'de konuşuyoruz. 🙂‍↔️"),
    ]
}
