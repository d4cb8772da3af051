/// Share URL templating
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::sns::SubItemDescriptor;

pub const TOKEN_URL: &str = "%url%";
pub const TOKEN_TEXT: &str = "%text%";
pub const TOKEN_ORIGIN: &str = "%origin%";
/// Older federated templates name the shared URL `%query%`
pub const TOKEN_QUERY: &str = "%query%";

/// Characters `encodeURIComponent` leaves alone
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Fill a plain network template with the encoded url and text
pub fn build_url(template: &str, url: &str, text: &str) -> String {
    template
        .replace(TOKEN_URL, &encode_component(url))
        .replace(TOKEN_TEXT, &encode_component(text))
}

/// Fill a federated network template.
///
/// An instance value that is missing, unparseable, or not http(s) leaves the
/// share url untouched so that sharing still works without the network.
pub fn build_sub_item_url(item: &SubItemDescriptor, url: &str, text: &str) -> String {
    let Some(instance) = item.instance_url() else {
        log::warn!(
            "Instance URL {:?} is not usable, sharing the bare URL",
            item.instance_value
        );
        return url.to_string();
    };

    let origin = instance.origin().ascii_serialization();
    let enc_url = encode_component(url);
    let mut out = item
        .url_template
        .replace(TOKEN_ORIGIN, &origin)
        .replace(TOKEN_URL, &enc_url)
        .replace(TOKEN_QUERY, &enc_url);
    if out.contains(TOKEN_TEXT) {
        out = out.replace(TOKEN_TEXT, &encode_component(text));
    }
    out
}
