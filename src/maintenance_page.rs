// src/maintenance_page.rs
// HTML for the 503 maintenance response: text or image variant plus the
// optional password unlock form.

use crate::config::Config;
use crate::gate::unlock::{NONCE_FIELD, PASSWORD_FIELD};
use crate::security::html::{escape_html, sanitize_post_html, sanitize_url};

const PAGE_TITLE: &str = "PDMI Onderhoudspagina";
const IMAGE_ALT: &str = "Onderhoudsafbeelding";

const DEFAULT_COPY_HTML: &str = concat!(
    "<div class=\"pdmiuc-message\">",
    "<h2>We zijn zo terug</h2>",
    "<p>Onze website krijgt op dit moment een update. Kom later gerust terug voor de nieuwste versie.</p>",
    "<h2 lang=\"en\">We'll be right back</h2>",
    "<p lang=\"en\">Our website is being updated right now. Please check back soon for the latest version.</p>",
    "</div>"
);

const PAGE_STYLE: &str = concat!(
    "<style>",
    "html,body{margin:0;padding:0;min-height:100%;background:#fff;color:#000;font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",sans-serif;}",
    "body{min-height:100vh;overflow:hidden;}",
    ".pdmiuc-stage{position:fixed;inset:0;width:100%;height:100%;display:flex;align-items:center;justify-content:center;background:#fff;}",
    ".pdmiuc-layer{width:100%;height:100%;display:flex;flex-direction:column;align-items:center;justify-content:center;}",
    ".pdmiuc-stage--text .pdmiuc-layer{padding:8vw 6vw;}",
    ".pdmiuc-stage--image .pdmiuc-layer{padding:4vw 6vw;}",
    ".pdmiuc-message{width:100%;max-width:960px;margin:0 auto;text-align:center;white-space:pre-line;}",
    ".pdmiuc-message h2{margin:0 0 1rem;font-size:clamp(2.4rem,5vw,4rem);color:#000;}",
    ".pdmiuc-message p{margin:0 auto;font-size:1.2rem;line-height:1.8;max-width:720px;color:#000;}",
    ".pdmiuc-media{width:100%;max-width:960px;display:flex;align-items:center;justify-content:center;background:#fff;margin:0 auto 1.5rem;}",
    ".pdmiuc-media img{max-width:100%;max-height:80vh;width:auto;height:auto;object-fit:contain;display:block;}",
    ".pdmiuc-password-wrapper{margin-top:2rem;text-align:center;}",
    ".pdmiuc-password-toggle{background:none;border:none;padding:0;color:#000;font-weight:600;cursor:pointer;text-decoration:underline;text-underline-offset:0.15em;font-size:0.875rem;}",
    ".pdmiuc-password-toggle:focus{outline:2px solid #000;outline-offset:2px;}",
    ".pdmiuc-password-form{margin-top:1rem;display:none;flex-wrap:wrap;justify-content:center;gap:0.75rem;}",
    ".pdmiuc-password-form input[type=\"password\"]{padding:0.5rem 0.75rem;font-size:1rem;min-width:220px;border:1px solid #ccc;border-radius:4px;}",
    ".pdmiuc-password-form button{padding:0.5rem 1.25rem;font-size:1rem;border-radius:4px;border:none;background:#000;color:#fff;cursor:pointer;}",
    ".screen-reader-text{position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0,0,0,0);}",
    "@media (max-width:768px){.pdmiuc-stage--text .pdmiuc-layer{padding:12vw 6vw;}}",
    "</style>"
);

const TOGGLE_SCRIPT: &str = concat!(
    "<script>",
    "document.addEventListener(\"DOMContentLoaded\",function(){",
    "document.querySelectorAll(\".pdmiuc-password-toggle\").forEach(function(toggle){",
    "toggle.addEventListener(\"click\",function(e){e.preventDefault();",
    "var wrapper=toggle.closest(\".pdmiuc-password-wrapper\");if(!wrapper){return;}",
    "var form=wrapper.querySelector(\".pdmiuc-password-form\");if(!form){return;}",
    "form.style.display=(\"none\"===getComputedStyle(form).display)?\"flex\":\"none\";",
    "});",
    "});",
    "});",
    "</script>"
);

fn password_form(nonce: &str) -> String {
    format!(
        concat!(
            "<div class=\"pdmiuc-password-wrapper\">",
            "<button type=\"button\" class=\"pdmiuc-password-toggle\">WACHTWOORD</button>",
            "<form method=\"post\" class=\"pdmiuc-password-form\">",
            "<input type=\"hidden\" id=\"{nonce_field}\" name=\"{nonce_field}\" value=\"{nonce}\" />",
            "<label class=\"screen-reader-text\" for=\"{password_field}\">Voer wachtwoord in om de site te bekijken:</label>",
            "<input type=\"password\" id=\"{password_field}\" name=\"{password_field}\" autocomplete=\"off\" />",
            "<button type=\"submit\">Toegang</button>",
            "</form>",
            "</div>"
        ),
        nonce_field = NONCE_FIELD,
        password_field = PASSWORD_FIELD,
        nonce = escape_html(nonce),
    )
}

/// Renders the complete maintenance document. `nonce` is embedded in the
/// unlock form, which is only rendered when a password is configured.
pub fn render_maintenance_page(config: &Config, nonce: &str) -> String {
    let image_url = if config.shows_image() {
        sanitize_url(&config.image_url)
    } else {
        String::new()
    };
    let is_image = !image_url.is_empty();

    let mut content = if is_image {
        format!(
            "<div class=\"pdmiuc-media\"><img src=\"{}\" alt=\"{}\" /></div>",
            escape_html(&image_url),
            IMAGE_ALT
        )
    } else {
        let text = sanitize_post_html(&config.text_content);
        if text.is_empty() {
            DEFAULT_COPY_HTML.to_string()
        } else {
            format!("<div class=\"pdmiuc-message\">{}</div>", text)
        }
    };

    let script = if config.has_password() {
        content.push_str(&password_form(nonce));
        TOGGLE_SCRIPT
    } else {
        ""
    };

    let variant = if is_image { "image" } else { "text" };
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"nl\"><head><meta charset=\"utf-8\" />",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />",
            "<meta name=\"robots\" content=\"noindex,nofollow\" />",
            "<title>{title}</title>{style}</head><body>",
            "<div class=\"pdmiuc-stage pdmiuc-stage--{variant}\"><div class=\"pdmiuc-layer\">",
            "{content}</div></div>{script}</body></html>"
        ),
        title = PAGE_TITLE,
        style = PAGE_STYLE,
        variant = variant,
        content = content,
        script = script,
    )
}
