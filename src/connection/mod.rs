// Connexion - Output device status

pub mod status;
