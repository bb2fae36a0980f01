pub mod whisper;
pub mod yandex_gpt;
