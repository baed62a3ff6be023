//! Server-rendered HTML pages

use html_to_string_macro::html;
use spotify_api::{ProfileView, TrackSummary};

macro_rules! layout {
    ($title: expr, $($html: tt)*) => {
        layout($title, html! { $($html)* })
    };
}

/// Landing page. Error and token fragments (`/#error=...`) are read by
/// client-side code; the server never sees them.
pub fn index_page() -> String {
    layout! {
        "Spotify Auth Relay",
        <h1>"Spotify Auth Relay"</h1>
        <p>"Sign in to see what you have been listening to."</p>
        <a class="button" href="/login">"Log in with Spotify"</a>
    }
}

pub fn profile_page(view: &ProfileView) -> String {
    let name = escape(view.name.as_deref().unwrap_or("Spotify listener"));

    let now_playing = match &view.currently_playing {
        Some(track) => html! {
            <p class="now-playing">{track_line(track)}</p>
        },
        None => html! {
            <p class="muted">"Nothing is playing right now."</p>
        },
    };

    let recent: String = view
        .recently_played
        .iter()
        .map(|track| html! { <li>{track_line(track)}</li> })
        .collect();
    let top_tracks = list_items(&view.top_tracks);
    let top_artists = list_items(&view.top_artists);

    layout! {
        "Your Spotify profile",
        <h1>"Hello, "<span class="green">{name}</span></h1>
        <h2>"Currently playing"</h2>
        {now_playing}
        <h2>"Recently played"</h2>
        <ol>{recent}</ol>
        <h2>"Top tracks"</h2>
        <ol>{top_tracks}</ol>
        <h2>"Top artists"</h2>
        <ol>{top_artists}</ol>
    }
}

fn track_line(track: &TrackSummary) -> String {
    if track.artist_name.is_empty() {
        return escape(&track.track_name);
    }
    format!(
        "{} &middot; {}",
        escape(&track.track_name),
        escape(&track.artist_name)
    )
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| html! { <li>{escape(item)}</li> })
        .collect()
}

/// Escape text taken from provider responses before it lands in markup.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: String) -> String {
    html! {
        <html>
            <head>
                <title>{escape(title)}</title>
                <style>"
                * {
                    box-sizing: border-box
                }
                html {
                    font-family: Arial;
                    background-color: #191414;
                    color: #FFFFFF
                }
                body {
                    max-width: 40rem;
                    margin: 0 auto;
                    padding: 1.5rem;
                }
                .green {
                    color: #1DB954
                }
                .muted {
                    color: #B3B3B3
                }
                .button {
                    display: inline-block;
                    padding: 0.75rem 1.5rem;
                    border-radius: 2rem;
                    background-color: #1DB954;
                    color: #FFFFFF;
                    text-decoration: none
                }
                "</style>
            </head>
            <body>
                {body}
            </body>
        </html>
    }
}
