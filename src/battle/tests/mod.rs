#[cfg(test)]
pub mod common;


#[cfg(test)]
mod test_redirection;


#[cfg(test)]
mod test_multi_target;

#[cfg(test)]
mod test_effect_lifecycle;




#[cfg(test)]
mod test_waves;

#[cfg(test)]
mod test_commands;
