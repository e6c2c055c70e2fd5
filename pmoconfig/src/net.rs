use std::net::UdpSocket;

/// Devine l'adresse IP locale utilisée pour sortir sur le réseau.
///
/// Aucun paquet n'est envoyé : `connect` sur une socket UDP ne fait que
/// choisir l'interface de sortie. Retourne `127.0.0.1` en cas d'échec.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}
